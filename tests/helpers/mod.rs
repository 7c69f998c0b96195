// Shared fakes for the integration tests; each test binary uses a subset.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sail_conditions::models::{GeoCoordinate, TideEvent, TideKind, TideStation};
use sail_conditions::solar::{TimezoneSource, ZoneInfo};
use sail_conditions::tides::{PredictionRequest, StationQuery, TideSource};
use sail_conditions::weather::{DailyMetric, DailyQuery, DailySeries, Dataset, ForecastSource};
use sail_conditions::{Result, SailError};

type Responder<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Jamestown, RI
pub const JAMESTOWN: (f64, f64) = (41.497, -71.362);

pub fn jamestown() -> GeoCoordinate {
    GeoCoordinate::new(JAMESTOWN.0, JAMESTOWN.1).unwrap()
}

/// Fixed "now" for forecast-mode selection: 2025-01-01 12:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn upstream_down(service: &'static str) -> SailError {
    SailError::upstream(service, "HTTP 503 Service Unavailable")
}

// ---------- weather ----------

pub fn weather_series(date: &str) -> DailySeries {
    DailySeries::new([date])
        .with_metric(DailyMetric::WeatherCode, vec![Some(2.0)])
        .with_metric(DailyMetric::TemperatureMax, vec![Some(72.4)])
        .with_metric(DailyMetric::TemperatureMin, vec![Some(58.1)])
        .with_metric(DailyMetric::WindSpeedMax, vec![Some(14.0)])
        .with_metric(DailyMetric::WindGustsMax, vec![Some(21.5)])
        .with_metric(DailyMetric::WindDirectionDominant, vec![Some(225.0)])
        .with_metric(DailyMetric::PrecipitationSum, vec![Some(0.1)])
}

pub fn marine_series(date: &str) -> DailySeries {
    DailySeries::new([date])
        .with_metric(DailyMetric::WaveHeightMax, vec![Some(1.0)])
        .with_metric(DailyMetric::WaveDirectionDominant, vec![Some(190.0)])
        .with_metric(DailyMetric::WavePeriodMax, vec![Some(7.5)])
}

pub struct FakeForecast {
    weather: Responder<DailySeries>,
    marine: Responder<DailySeries>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Dataset>>,
}

impl FakeForecast {
    pub fn new(
        weather: impl Fn() -> Result<DailySeries> + Send + Sync + 'static,
        marine: impl Fn() -> Result<DailySeries> + Send + Sync + 'static,
    ) -> Self {
        Self {
            weather: Box::new(weather),
            marine: Box::new(marine),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Both datasets answer with data for `date`
    pub fn healthy(date: &'static str) -> Self {
        Self::new(move || Ok(weather_series(date)), move || Ok(marine_series(date)))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Dataset> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastSource for FakeForecast {
    async fn daily(&self, query: &DailyQuery) -> Result<DailySeries> {
        self.calls.lock().unwrap().push(query.dataset);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match query.dataset {
            Dataset::Forecast | Dataset::Seasonal => (self.weather)(),
            Dataset::Marine => (self.marine)(),
        }
    }
}

// ---------- tides ----------

pub fn station(id: &str, name: &str, latitude: f64, longitude: f64) -> TideStation {
    TideStation {
        id: id.to_string(),
        name: name.to_string(),
        location: GeoCoordinate::new(latitude, longitude).unwrap(),
    }
}

pub fn newport() -> TideStation {
    station("8452660", "Newport", 41.505, -71.326)
}

pub fn event(time: &str, kind: TideKind, height_ft: f64) -> TideEvent {
    let time = NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M").unwrap();
    TideEvent::new(time, kind, height_ft)
}

pub struct FakeTides {
    stations: Box<dyn Fn(u32) -> Result<Vec<TideStation>> + Send + Sync>,
    predictions: Box<dyn Fn(&str) -> Result<Vec<TideEvent>> + Send + Sync>,
    delay: Option<Duration>,
    radii: Mutex<Vec<u32>>,
    requests: Mutex<Vec<PredictionRequest>>,
}

impl FakeTides {
    /// `stations` gets the radius; `predictions` gets the station id
    pub fn new(
        stations: impl Fn(u32) -> Result<Vec<TideStation>> + Send + Sync + 'static,
        predictions: impl Fn(&str) -> Result<Vec<TideEvent>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            stations: Box::new(stations),
            predictions: Box::new(predictions),
            delay: None,
            radii: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn radii(&self) -> Vec<u32> {
        self.radii.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_stations(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.station_id)
            .collect()
    }
}

#[async_trait]
impl TideSource for FakeTides {
    async fn find_stations(&self, query: &StationQuery) -> Result<Vec<TideStation>> {
        self.radii.lock().unwrap().push(query.radius_miles);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.stations)(query.radius_miles)
    }

    async fn predictions(&self, request: &PredictionRequest) -> Result<Vec<TideEvent>> {
        self.requests.lock().unwrap().push(request.clone());
        (self.predictions)(&request.station_id)
    }
}

// ---------- timezone ----------

pub fn new_york_daylight() -> ZoneInfo {
    ZoneInfo {
        zone_id: "America/New_York".to_string(),
        zone_name: "Eastern Daylight Time".to_string(),
        raw_offset_seconds: -18_000,
        dst_offset_seconds: 3_600,
    }
}

pub struct FakeTimezone {
    respond: Responder<ZoneInfo>,
    delay: Option<Duration>,
    lookups: AtomicUsize,
    requests: Mutex<Vec<(GeoCoordinate, DateTime<Utc>)>>,
}

impl FakeTimezone {
    pub fn new(respond: impl Fn() -> Result<ZoneInfo> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            delay: None,
            lookups: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Coordinate and instant of every lookup, in call order
    pub fn requests(&self) -> Vec<(GeoCoordinate, DateTime<Utc>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimezoneSource for FakeTimezone {
    async fn lookup(&self, coordinate: GeoCoordinate, at: DateTime<Utc>) -> Result<ZoneInfo> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((coordinate, at));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)()
    }
}
