//! NOAA CO-OPS client: station metadata and tide predictions

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{PredictionRequest, StationQuery, TideSource};
use crate::config::TidesConfig;
use crate::http::{get_json, url_with_params};
use crate::models::tides::TIDE_TIME_FORMAT;
use crate::models::{GeoCoordinate, TideEvent, TideKind, TideStation};
use crate::{Result, SailError};

const SERVICE: &str = "noaa";
const NOAA_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(default)]
    stations: Vec<NoaaStation>,
}

#[derive(Debug, Deserialize)]
struct NoaaStation {
    id: String,
    name: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    predictions: Option<Vec<NoaaPrediction>>,
    error: Option<NoaaErrorBody>,
}

#[derive(Debug, Deserialize)]
struct NoaaPrediction {
    t: String,
    v: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct NoaaErrorBody {
    message: String,
}

pub struct NoaaClient {
    client: ClientWithMiddleware,
    stations_url: String,
    predictions_url: String,
    application: String,
}

impl NoaaClient {
    pub fn new(client: ClientWithMiddleware, config: &TidesConfig) -> Self {
        Self {
            client,
            stations_url: config.stations_url.clone(),
            predictions_url: config.predictions_url.clone(),
            application: config.application.clone(),
        }
    }

    fn prediction_params(&self, request: &PredictionRequest) -> Vec<(&'static str, String)> {
        vec![
            ("product", "predictions".to_string()),
            ("application", self.application.clone()),
            ("station", request.station_id.clone()),
            (
                "begin_date",
                request.window.begin.format(NOAA_DATE_FORMAT).to_string(),
            ),
            (
                "end_date",
                request.window.end.format(NOAA_DATE_FORMAT).to_string(),
            ),
            ("datum", request.datum.to_string()),
            ("units", request.units.to_string()),
            ("interval", request.interval.to_string()),
            ("time_zone", request.time_zone.to_string()),
            ("format", "json".to_string()),
        ]
    }

    /// Every station of one type; the metadata API has no radius filter
    async fn station_list(&self, station_type: &str) -> Result<Vec<NoaaStation>> {
        let url = url_with_params(SERVICE, &self.stations_url, &[("type", station_type)])?;
        let response: StationsResponse = get_json(&self.client, SERVICE, url).await?;
        debug!(station_type, stations = response.stations.len(), "downloaded station list");
        Ok(response.stations)
    }
}

/// One `fetch_tides` call against NOAA: the station list is downloaded on
/// the first radius and filtered locally for the larger ones.
struct NoaaSearch<'a> {
    client: &'a NoaaClient,
    stations: OnceCell<(&'static str, Vec<NoaaStation>)>,
}

#[async_trait]
impl TideSource for NoaaSearch<'_> {
    async fn find_stations(&self, query: &StationQuery) -> Result<Vec<TideStation>> {
        let (station_type, stations) = self
            .stations
            .get_or_try_init(|| async {
                let stations = self.client.station_list(query.station_type).await?;
                Ok::<_, SailError>((query.station_type, stations))
            })
            .await?;

        if *station_type != query.station_type {
            return self.client.find_stations(query).await;
        }
        Ok(nearby_stations(stations, query))
    }

    async fn predictions(&self, request: &PredictionRequest) -> Result<Vec<TideEvent>> {
        self.client.predictions(request).await
    }
}

/// Keep the stations within `query.radius_miles`, nearest first
fn nearby_stations(stations: &[NoaaStation], query: &StationQuery) -> Vec<TideStation> {
    let radius = f64::from(query.radius_miles);
    let mut nearby: Vec<(f64, TideStation)> = stations
        .iter()
        .filter_map(|station| {
            let location = GeoCoordinate::new(station.lat, station.lng).ok()?;
            let distance = query.center.distance_miles(&location);
            (distance <= radius).then(|| {
                (
                    distance,
                    TideStation {
                        id: station.id.clone(),
                        name: station.name.clone(),
                        location,
                    },
                )
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
    nearby.into_iter().map(|(_, station)| station).collect()
}

fn parse_prediction(prediction: NoaaPrediction) -> Result<TideEvent> {
    let time = NaiveDateTime::parse_from_str(&prediction.t, TIDE_TIME_FORMAT).map_err(|e| {
        SailError::upstream(SERVICE, format!("bad prediction time {:?}: {e}", prediction.t))
    })?;
    let kind = TideKind::from_code(&prediction.kind).ok_or_else(|| {
        SailError::upstream(SERVICE, format!("bad prediction type {:?}", prediction.kind))
    })?;
    let height = prediction.v.trim().parse::<f64>().map_err(|e| {
        SailError::upstream(SERVICE, format!("bad prediction height {:?}: {e}", prediction.v))
    })?;
    Ok(TideEvent::new(time, kind, height))
}

#[async_trait]
impl TideSource for NoaaClient {
    async fn find_stations(&self, query: &StationQuery) -> Result<Vec<TideStation>> {
        let stations = self.station_list(query.station_type).await?;
        Ok(nearby_stations(&stations, query))
    }

    async fn predictions(&self, request: &PredictionRequest) -> Result<Vec<TideEvent>> {
        let url = url_with_params(
            SERVICE,
            &self.predictions_url,
            &self.prediction_params(request),
        )?;
        let response: PredictionsResponse = get_json(&self.client, SERVICE, url).await?;

        if let Some(error) = response.error {
            return Err(SailError::upstream(
                SERVICE,
                format!("station {}: {}", request.station_id, error.message.trim()),
            ));
        }
        let predictions = response.predictions.ok_or_else(|| {
            SailError::upstream(SERVICE, "response carried neither predictions nor an error")
        })?;

        predictions.into_iter().map(parse_prediction).collect()
    }

    fn search(&self) -> Option<Box<dyn TideSource + '_>> {
        Some(Box::new(NoaaSearch {
            client: self,
            stations: OnceCell::new(),
        }))
    }
}
