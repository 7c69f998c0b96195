//! `OpenMeteo` daily forecast client (forecast, seasonal and marine APIs)

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use super::{DailyQuery, DailySeries, Dataset, ForecastSource};
use crate::Result;
use crate::config::WeatherConfig;
use crate::http::{get_json, url_with_params};

/// Envelope of every `OpenMeteo` daily response
#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Option<DailySeries>,
}

pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    forecast_url: String,
    seasonal_url: String,
    marine_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: ClientWithMiddleware, config: &WeatherConfig) -> Self {
        Self {
            client,
            forecast_url: config.forecast_url.clone(),
            seasonal_url: config.seasonal_url.clone(),
            marine_url: config.marine_url.clone(),
        }
    }

    fn endpoint(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Forecast => &self.forecast_url,
            Dataset::Seasonal => &self.seasonal_url,
            Dataset::Marine => &self.marine_url,
        }
    }

    fn query_params(query: &DailyQuery) -> Vec<(&'static str, String)> {
        let daily = query
            .metrics
            .iter()
            .map(|metric| metric.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let date = query.date.to_string();

        let mut params = vec![
            ("latitude", query.coordinate.latitude.to_string()),
            ("longitude", query.coordinate.longitude.to_string()),
            ("daily", daily),
            ("start_date", date.clone()),
            ("end_date", date),
            ("timezone", "auto".to_string()),
        ];
        // seasonal ensembles stay metric and are converted by the aggregator
        if query.dataset == Dataset::Forecast {
            params.push(("temperature_unit", "fahrenheit".to_string()));
            params.push(("wind_speed_unit", "kn".to_string()));
        }
        params
    }
}

fn service_name(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Forecast => "open-meteo",
        Dataset::Seasonal => "open-meteo-seasonal",
        Dataset::Marine => "open-meteo-marine",
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn daily(&self, query: &DailyQuery) -> Result<DailySeries> {
        let service = service_name(query.dataset);
        let url = url_with_params(
            service,
            self.endpoint(query.dataset),
            &Self::query_params(query),
        )?;
        let response: DailyResponse = get_json(&self.client, service, url).await?;
        Ok(response.daily.unwrap_or_default())
    }
}

/// Convert `OpenMeteo` (WMO) weather code to human-readable description
#[must_use]
pub fn weather_code_to_description(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown weather",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarDate, ForecastType, GeoCoordinate};

    fn query(forecast_type: ForecastType) -> DailyQuery {
        DailyQuery::weather(
            GeoCoordinate::new(41.5, -71.25).unwrap(),
            CalendarDate::parse("2025-01-01").unwrap(),
            forecast_type,
        )
    }

    #[test]
    fn test_weather_params_request_imperial_units() {
        let params = OpenMeteoClient::query_params(&query(ForecastType::Standard));
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("latitude"), Some("41.5"));
        assert_eq!(get("longitude"), Some("-71.25"));
        assert_eq!(get("start_date"), Some("2025-01-01"));
        assert_eq!(get("end_date"), Some("2025-01-01"));
        assert_eq!(get("temperature_unit"), Some("fahrenheit"));
        assert_eq!(get("wind_speed_unit"), Some("kn"));
        assert!(get("daily").unwrap().starts_with("weather_code,temperature_2m_max"));
    }

    #[test]
    fn test_seasonal_params_keep_metric_units() {
        let params = OpenMeteoClient::query_params(&query(ForecastType::Seasonal));
        assert!(params.iter().all(|(k, _)| *k != "temperature_unit" && *k != "wind_speed_unit"));
        assert!(params.iter().any(|(k, v)| *k == "timezone" && v == "auto"));
    }

    #[test]
    fn test_marine_params_keep_metric_units() {
        let marine = DailyQuery::marine(
            GeoCoordinate::new(41.5, -71.25).unwrap(),
            CalendarDate::parse("2025-01-01").unwrap(),
        );
        let params = OpenMeteoClient::query_params(&marine);
        assert!(params.iter().all(|(k, _)| *k != "temperature_unit"));
        assert!(
            params
                .iter()
                .any(|(k, v)| *k == "daily" && v == "wave_height_max,wave_direction_dominant,wave_period_max")
        );
    }

    #[test]
    fn test_endpoint_per_dataset() {
        let client = OpenMeteoClient::new(
            reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
            &WeatherConfig::default(),
        );
        assert!(client.endpoint(Dataset::Forecast).contains("api.open-meteo.com"));
        assert!(client.endpoint(Dataset::Seasonal).contains("seasonal-api"));
        assert!(client.endpoint(Dataset::Marine).contains("marine-api"));
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(weather_code_to_description(1), "Mainly clear");
        assert_eq!(weather_code_to_description(95), "Thunderstorm");
        assert_eq!(weather_code_to_description(-1), "Unknown weather");
    }

    #[test]
    fn test_daily_response_parsing() {
        let body = r#"{
            "latitude": 41.5, "longitude": -71.25,
            "daily_units": {"time": "iso8601"},
            "daily": {
                "time": ["2025-01-01"],
                "weather_code": [3],
                "temperature_2m_max": [41.2],
                "wind_direction_10m_dominant": [null]
            }
        }"#;
        let response: DailyResponse = serde_json::from_str(body).unwrap();
        let daily = response.daily.unwrap();
        assert_eq!(daily.time, vec!["2025-01-01"]);
        assert_eq!(daily.first(super::super::DailyMetric::WeatherCode), Some(3.0));
        assert_eq!(daily.first(super::super::DailyMetric::WindDirectionDominant), None);
    }
}
