//! Google Time Zone API client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::{TimezoneSource, ZoneInfo};
use crate::config::TimezoneConfig;
use crate::http::{get_json, url_with_params};
use crate::models::GeoCoordinate;
use crate::{Result, SailError};

const SERVICE: &str = "google-timezone";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimezoneResponse {
    status: String,
    #[serde(default)]
    dst_offset: f64,
    #[serde(default)]
    raw_offset: f64,
    time_zone_id: Option<String>,
    time_zone_name: Option<String>,
    error_message: Option<String>,
}

impl TimezoneResponse {
    fn into_zone(self) -> Result<ZoneInfo> {
        if self.status != "OK" {
            let detail = self.error_message.unwrap_or_default();
            return Err(SailError::upstream(
                SERVICE,
                format!("status {}: {}", self.status, detail.trim()),
            ));
        }
        let zone_id = self
            .time_zone_id
            .ok_or_else(|| SailError::upstream(SERVICE, "response is missing timeZoneId"))?;

        Ok(ZoneInfo {
            zone_name: self.time_zone_name.unwrap_or_else(|| zone_id.clone()),
            zone_id,
            raw_offset_seconds: self.raw_offset.round() as i32,
            dst_offset_seconds: self.dst_offset.round() as i32,
        })
    }
}

pub struct GoogleTimezoneClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleTimezoneClient {
    pub fn new(client: ClientWithMiddleware, config: &TimezoneConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl TimezoneSource for GoogleTimezoneClient {
    async fn lookup(&self, coordinate: GeoCoordinate, at: DateTime<Utc>) -> Result<ZoneInfo> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SailError::config("no Google Maps API key configured"))?;

        let params = [
            (
                "location",
                format!("{},{}", coordinate.latitude, coordinate.longitude),
            ),
            ("timestamp", at.timestamp().to_string()),
            ("key", api_key.to_string()),
        ];
        let url = url_with_params(SERVICE, &self.base_url, &params)?;
        let response: TimezoneResponse = get_json(&self.client, SERVICE, url).await?;
        response.into_zone()
    }
}
