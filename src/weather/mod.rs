//! Weather aggregation
//!
//! [`WeatherAggregator`] asks a [`ForecastSource`] for two daily series at
//! once: the weather forecast (critical) and the marine forecast
//! (optional). Both calls run concurrently and meet at a single join. A
//! failed weather call fails the fetch and drops the marine call; a failed
//! marine call is logged and replaced by [`MarineRecord::unavailable`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::context::RequestContext;
use crate::models::{
    CalendarDate, ForecastType, GeoCoordinate, MarineRecord, WeatherRecord, WeatherReport,
};
use crate::units::{celsius_to_fahrenheit, degrees_to_compass, kmh_to_knots, meters_to_feet};
use crate::{Result, SailError};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

const SERVICE: &str = "open-meteo";

/// Daily variables understood by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyMetric {
    WeatherCode,
    TemperatureMax,
    TemperatureMin,
    WindSpeedMax,
    WindGustsMax,
    WindDirectionDominant,
    PrecipitationSum,
    WaveHeightMax,
    WaveDirectionDominant,
    WavePeriodMax,
}

impl DailyMetric {
    pub const WEATHER: [DailyMetric; 7] = [
        DailyMetric::WeatherCode,
        DailyMetric::TemperatureMax,
        DailyMetric::TemperatureMin,
        DailyMetric::WindSpeedMax,
        DailyMetric::WindGustsMax,
        DailyMetric::WindDirectionDominant,
        DailyMetric::PrecipitationSum,
    ];

    pub const MARINE: [DailyMetric; 3] = [
        DailyMetric::WaveHeightMax,
        DailyMetric::WaveDirectionDominant,
        DailyMetric::WavePeriodMax,
    ];

    /// Open-Meteo variable name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyMetric::WeatherCode => "weather_code",
            DailyMetric::TemperatureMax => "temperature_2m_max",
            DailyMetric::TemperatureMin => "temperature_2m_min",
            DailyMetric::WindSpeedMax => "wind_speed_10m_max",
            DailyMetric::WindGustsMax => "wind_gusts_10m_max",
            DailyMetric::WindDirectionDominant => "wind_direction_10m_dominant",
            DailyMetric::PrecipitationSum => "precipitation_sum",
            DailyMetric::WaveHeightMax => "wave_height_max",
            DailyMetric::WaveDirectionDominant => "wave_direction_dominant",
            DailyMetric::WavePeriodMax => "wave_period_max",
        }
    }

    fn combine(&self, members: &[f64]) -> f64 {
        match self {
            DailyMetric::WeatherCode => most_frequent(members),
            DailyMetric::WindDirectionDominant | DailyMetric::WaveDirectionDominant => {
                circular_mean(members)
            }
            _ => members.iter().sum::<f64>() / members.len() as f64,
        }
    }
}

/// Which upstream dataset a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Short-range forecast; temperatures in °F, wind in knots
    Forecast,
    /// Long-range seasonal ensemble; same units as `Forecast`
    Seasonal,
    /// Wave forecast; heights in meters
    Marine,
}

/// One daily-metrics request for a single date
#[derive(Debug, Clone, PartialEq)]
pub struct DailyQuery {
    pub coordinate: GeoCoordinate,
    pub date: CalendarDate,
    pub dataset: Dataset,
    pub metrics: Vec<DailyMetric>,
}

impl DailyQuery {
    #[must_use]
    pub fn weather(coordinate: GeoCoordinate, date: CalendarDate, forecast_type: ForecastType) -> Self {
        let dataset = match forecast_type {
            ForecastType::Standard => Dataset::Forecast,
            ForecastType::Seasonal => Dataset::Seasonal,
        };
        Self {
            coordinate,
            date,
            dataset,
            metrics: DailyMetric::WEATHER.to_vec(),
        }
    }

    #[must_use]
    pub fn marine(coordinate: GeoCoordinate, date: CalendarDate) -> Self {
        Self {
            coordinate,
            date,
            dataset: Dataset::Marine,
            metrics: DailyMetric::MARINE.to_vec(),
        }
    }
}

/// Daily time series as returned by Open-Meteo: a `time` axis plus one
/// value array per variable. Ensemble datasets report variables as
/// `<name>_memberNN`; [`DailySeries::first`] merges those.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(flatten)]
    pub values: HashMap<String, Vec<Option<f64>>>,
}

impl DailySeries {
    #[must_use]
    pub fn new<S: Into<String>>(time: impl IntoIterator<Item = S>) -> Self {
        Self {
            time: time.into_iter().map(Into::into).collect(),
            values: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_metric(mut self, metric: DailyMetric, values: Vec<Option<f64>>) -> Self {
        self.values.insert(metric.as_str().to_string(), values);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Value of `metric` on the first day, if the upstream reported one
    #[must_use]
    pub fn first(&self, metric: DailyMetric) -> Option<f64> {
        if let Some(values) = self.values.get(metric.as_str()) {
            return values.first().copied().flatten();
        }

        let prefix = format!("{}_member", metric.as_str());
        let members: Vec<f64> = self
            .values
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .filter_map(|(_, values)| values.first().copied().flatten())
            .collect();

        if members.is_empty() {
            None
        } else {
            Some(metric.combine(&members))
        }
    }
}

/// Capability: fetch daily metrics for a query
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn daily(&self, query: &DailyQuery) -> Result<DailySeries>;
}

/// Fetches and merges the daily weather and marine forecasts
pub struct WeatherAggregator {
    source: Arc<dyn ForecastSource>,
    seasonal_threshold_days: u32,
    clock: fn() -> DateTime<Utc>,
}

impl WeatherAggregator {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self {
            source,
            seasonal_threshold_days: 14,
            clock: Utc::now,
        }
    }

    #[must_use]
    pub fn with_seasonal_threshold(mut self, days: u32) -> Self {
        self.seasonal_threshold_days = days;
        self
    }

    /// Replace the wall clock used to pick the forecast mode
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[instrument(skip(self, ctx), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn fetch_weather(
        &self,
        ctx: &RequestContext,
        coordinate: GeoCoordinate,
        date: &str,
    ) -> Result<WeatherReport> {
        let started = Instant::now();
        let date = CalendarDate::parse(date)?;

        let forecast_type =
            ForecastType::for_date(date, (self.clock)(), self.seasonal_threshold_days);
        let weather_query = DailyQuery::weather(coordinate, date, forecast_type);
        let marine_query = DailyQuery::marine(coordinate, date);
        debug!(%date, %forecast_type, "fetching weather and marine forecasts");

        let (weather, marine) = ctx
            .run("fetch_weather", async {
                let critical = async {
                    self.source
                        .daily(&weather_query)
                        .await
                        .map_err(as_upstream)
                };
                // never fails the join; the outcome is inspected afterwards
                let optional = async { Ok::<_, SailError>(self.source.daily(&marine_query).await) };
                tokio::try_join!(critical, optional)
            })
            .await?;

        if weather.is_empty() {
            return Err(SailError::no_data(SERVICE, date.to_string()));
        }

        let marine = match marine {
            Ok(series) => marine_record(&series),
            Err(e) => {
                warn!(error = %e, "marine forecast unavailable, continuing without sea state");
                MarineRecord::unavailable()
            }
        };

        let report = WeatherReport {
            weather: weather_record(&weather, forecast_type),
            marine,
            debug_duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            date = %report.weather.date,
            condition = %report.weather.condition,
            marine_available = report.marine.available,
            "weather forecast ready"
        );
        Ok(report)
    }
}

fn as_upstream(err: SailError) -> SailError {
    match err {
        SailError::UpstreamUnavailable { .. } | SailError::Cancelled { .. } => err,
        other => SailError::upstream(SERVICE, other),
    }
}

fn weather_record(series: &DailySeries, forecast_type: ForecastType) -> WeatherRecord {
    let condition = series
        .first(DailyMetric::WeatherCode)
        .map_or("Unknown weather", |code| {
            open_meteo::weather_code_to_description(code.round() as i64)
        });

    let wind_direction_deg = series
        .first(DailyMetric::WindDirectionDominant)
        .map_or(0, |deg| deg.round().rem_euclid(360.0) as u16);

    // the seasonal dataset reports °C and km/h
    let seasonal = forecast_type == ForecastType::Seasonal;
    let temperature = |metric| {
        series
            .first(metric)
            .map_or(0.0, |v| if seasonal { celsius_to_fahrenheit(v) } else { v })
    };
    let speed = |metric| {
        series
            .first(metric)
            .map_or(0.0, |v| if seasonal { kmh_to_knots(v) } else { v })
    };

    WeatherRecord {
        date: series.time.first().cloned().unwrap_or_default(),
        condition: condition.to_string(),
        forecast_type,
        max_temp_f: temperature(DailyMetric::TemperatureMax),
        min_temp_f: temperature(DailyMetric::TemperatureMin),
        max_wind_kts: speed(DailyMetric::WindSpeedMax),
        max_gusts_kts: speed(DailyMetric::WindGustsMax),
        wind_direction_deg,
        wind_direction: degrees_to_compass(f64::from(wind_direction_deg)).to_string(),
        precipitation_total: series.first(DailyMetric::PrecipitationSum).unwrap_or(0.0),
    }
}

fn marine_record(series: &DailySeries) -> MarineRecord {
    if series.is_empty() {
        return MarineRecord::unavailable();
    }

    let height = series.first(DailyMetric::WaveHeightMax);
    let direction = series.first(DailyMetric::WaveDirectionDominant);
    let period = series.first(DailyMetric::WavePeriodMax);

    // inland points come back with a time axis but only nulls
    if height.is_none() && direction.is_none() && period.is_none() {
        return MarineRecord::unavailable();
    }

    MarineRecord {
        wave_height_ft: meters_to_feet(height.unwrap_or(0.0)),
        wave_direction_deg: direction.unwrap_or(0.0),
        wave_period_s: period.unwrap_or(0.0),
        available: true,
    }
}

fn most_frequent(values: &[f64]) -> f64 {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for value in values {
        let key = value.round() as i64;
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    // ties resolve to the more severe (higher) code
    counts
        .into_iter()
        .max_by_key(|&(key, count)| (count, key))
        .map_or(0.0, |(key, _)| key as f64)
}

fn circular_mean(degrees: &[f64]) -> f64 {
    let (sin, cos) = degrees.iter().fold((0.0, 0.0), |(s, c), deg| {
        let rad = deg.to_radians();
        (s + rad.sin(), c + rad.cos())
    });
    sin.atan2(cos).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reads_plain_metric() {
        let series = DailySeries::new(["2025-01-01"])
            .with_metric(DailyMetric::TemperatureMax, vec![Some(75.0)])
            .with_metric(DailyMetric::TemperatureMin, vec![None]);
        assert_eq!(series.first(DailyMetric::TemperatureMax), Some(75.0));
        assert_eq!(series.first(DailyMetric::TemperatureMin), None);
        assert_eq!(series.first(DailyMetric::WindSpeedMax), None);
    }

    #[test]
    fn first_merges_ensemble_members() {
        let mut series = DailySeries::new(["2025-06-01"]);
        for (name, value) in [
            ("temperature_2m_max_member01", 70.0),
            ("temperature_2m_max_member02", 74.0),
            ("weather_code_member01", 3.0),
            ("weather_code_member02", 61.0),
            ("weather_code_member03", 61.0),
            ("wind_direction_10m_dominant_member01", 350.0),
            ("wind_direction_10m_dominant_member02", 10.0),
        ] {
            series.values.insert(name.to_string(), vec![Some(value)]);
        }

        assert_eq!(series.first(DailyMetric::TemperatureMax), Some(72.0));
        assert_eq!(series.first(DailyMetric::WeatherCode), Some(61.0));
        let direction = series.first(DailyMetric::WindDirectionDominant).unwrap();
        assert!(direction < 0.5 || direction > 359.5, "got {direction}");
    }

    #[test]
    fn weather_record_defaults_missing_fields_to_zero() {
        let series = DailySeries::new(["2025-01-01"]);
        let record = weather_record(&series, ForecastType::Standard);
        assert_eq!(record.date, "2025-01-01");
        assert_eq!(record.condition, "Unknown weather");
        assert_eq!(record.max_temp_f, 0.0);
        assert_eq!(record.wind_direction_deg, 0);
        assert_eq!(record.wind_direction, "N");
    }

    #[test]
    fn seasonal_record_converts_metric_units() {
        let series = DailySeries::new(["2025-06-01"])
            .with_metric(DailyMetric::TemperatureMax, vec![Some(25.0)])
            .with_metric(DailyMetric::WindSpeedMax, vec![Some(18.52)]);
        let record = weather_record(&series, ForecastType::Seasonal);
        assert!((record.max_temp_f - 77.0).abs() < 1e-9);
        assert!((record.max_wind_kts - 10.0).abs() < 1e-9);
        assert_eq!(record.min_temp_f, 0.0);
    }

    #[test]
    fn marine_record_converts_meters_to_feet() {
        let series = DailySeries::new(["2025-01-01"])
            .with_metric(DailyMetric::WaveHeightMax, vec![Some(1.5)])
            .with_metric(DailyMetric::WaveDirectionDominant, vec![Some(180.0)])
            .with_metric(DailyMetric::WavePeriodMax, vec![Some(8.0)]);
        let record = marine_record(&series);
        assert!(record.available);
        assert!((record.wave_height_ft - 4.92).abs() < 0.01);
        assert_eq!(record.wave_direction_deg, 180.0);
        assert_eq!(record.wave_period_s, 8.0);
    }

    #[test]
    fn marine_record_all_null_is_unavailable() {
        let series = DailySeries::new(["2025-01-01"])
            .with_metric(DailyMetric::WaveHeightMax, vec![None]);
        assert_eq!(marine_record(&series), MarineRecord::unavailable());
        assert_eq!(marine_record(&DailySeries::default()), MarineRecord::unavailable());
    }

    #[test]
    fn weather_query_dataset_follows_forecast_type() {
        let coordinate = GeoCoordinate::new(41.5, -71.3).unwrap();
        let date = CalendarDate::parse("2025-01-01").unwrap();
        assert_eq!(
            DailyQuery::weather(coordinate, date, ForecastType::Seasonal).dataset,
            Dataset::Seasonal
        );
        assert_eq!(DailyQuery::marine(coordinate, date).metrics.len(), 3);
    }
}
