//! Tide station resolution and tide predictions
//!
//! [`TideResolver`] looks for tide-prediction stations around a point with
//! a growing radius (see [`StationSearch`]), keeps the nearest few, then
//! asks them for high/low predictions one after another. The first station
//! that answers wins; later candidates are never contacted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument, warn};

use crate::context::RequestContext;
use crate::models::{CalendarDate, GeoCoordinate, TideEvent, TideReport, TideStation};
use crate::{Result, SailError};

pub mod noaa;
pub mod search;

pub use noaa::NoaaClient;
pub use search::StationSearch;

const SERVICE: &str = "noaa";

/// Station type offering harmonic tide predictions
pub const TIDE_PREDICTION_STATIONS: &str = "tidepredictions";

/// Days of context fetched on each side of the requested date
pub const BUFFER_DAYS: u64 = 2;

/// Discovery request: stations of one type within a radius
#[derive(Debug, Clone, PartialEq)]
pub struct StationQuery {
    pub center: GeoCoordinate,
    pub radius_miles: u32,
    pub station_type: &'static str,
}

impl StationQuery {
    #[must_use]
    pub fn tide_predictions(center: GeoCoordinate, radius_miles: u32) -> Self {
        Self {
            center,
            radius_miles,
            station_type: TIDE_PREDICTION_STATIONS,
        }
    }
}

/// Inclusive date range of a prediction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionWindow {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl PredictionWindow {
    /// The buffered window: two days before through two days after `date`
    #[must_use]
    pub fn around(date: CalendarDate) -> Self {
        Self {
            begin: date.days_before(BUFFER_DAYS),
            end: date.days_after(BUFFER_DAYS),
        }
    }

    #[must_use]
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        (self.begin..=self.end).contains(&time.date())
    }
}

/// High/low prediction request for one station
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub station_id: String,
    pub window: PredictionWindow,
    pub datum: &'static str,
    pub units: &'static str,
    pub interval: &'static str,
    pub time_zone: &'static str,
}

impl PredictionRequest {
    /// High/low events in feet above MLLW, station local standard/daylight time
    #[must_use]
    pub fn high_low(station_id: &str, window: PredictionWindow) -> Self {
        Self {
            station_id: station_id.to_string(),
            window,
            datum: "MLLW",
            units: "english",
            interval: "hilo",
            time_zone: "lst_ldt",
        }
    }
}

/// Capability: discover stations and fetch their predictions
#[async_trait]
pub trait TideSource: Send + Sync {
    /// Stations matching the query, nearest first
    async fn find_stations(&self, query: &StationQuery) -> Result<Vec<TideStation>>;

    async fn predictions(&self, request: &PredictionRequest) -> Result<Vec<TideEvent>>;

    /// Source used for the whole of one `fetch_tides` call, for sources
    /// that can reuse work between radii. `None` means `self` is used as is.
    fn search(&self) -> Option<Box<dyn TideSource + '_>> {
        None
    }
}

pub struct TideResolver {
    source: Arc<dyn TideSource>,
    min_radius_miles: u32,
    radius_multiplier: u32,
    max_candidates: usize,
}

impl TideResolver {
    pub fn new(source: Arc<dyn TideSource>) -> Self {
        Self {
            source,
            min_radius_miles: 50,
            radius_multiplier: 10,
            max_candidates: 5,
        }
    }

    #[must_use]
    pub fn with_search(mut self, min_radius_miles: u32, radius_multiplier: u32, max_candidates: usize) -> Self {
        self.min_radius_miles = min_radius_miles;
        self.radius_multiplier = radius_multiplier;
        self.max_candidates = max_candidates;
        self
    }

    #[instrument(skip(self, ctx), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn fetch_tides(
        &self,
        ctx: &RequestContext,
        coordinate: GeoCoordinate,
        date: &str,
    ) -> Result<TideReport> {
        let date = CalendarDate::parse(date)?;
        ctx.run("fetch_tides", self.resolve(coordinate, date)).await
    }

    async fn resolve(&self, coordinate: GeoCoordinate, date: CalendarDate) -> Result<TideReport> {
        let search = self.source.search();
        let source = search.as_deref().unwrap_or(&*self.source);

        let candidates = self.discover(source, coordinate).await?;
        let window = PredictionWindow::around(date);

        let mut last_error = None;
        for station in candidates {
            let request = PredictionRequest::high_low(&station.id, window);
            match source.predictions(&request).await {
                Ok(events) => return Ok(build_report(coordinate, station, window, events)),
                Err(e) => {
                    warn!(station = %station.id, error = %e, "tide predictions failed, trying next station");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or_else(
            || SailError::upstream(SERVICE, "no station answered the prediction request"),
            as_upstream,
        ))
    }

    async fn discover(
        &self,
        source: &dyn TideSource,
        coordinate: GeoCoordinate,
    ) -> Result<Vec<TideStation>> {
        let mut search =
            StationSearch::new(self.min_radius_miles, self.radius_multiplier, self.max_candidates);

        while let Some(radius) = search.next_radius() {
            let query = StationQuery::tide_predictions(coordinate, radius);
            let stations = source
                .find_stations(&query)
                .await
                .map_err(as_upstream)?;
            debug!(radius, attempt = search.attempts(), found = stations.len(), "station search");
            if search.record(stations) {
                break;
            }
        }

        if !search.is_resolved() {
            return Err(SailError::not_found(format!(
                "tide station within {} miles of {}",
                search.max_radius(),
                coordinate.format_coordinates()
            )));
        }
        Ok(search.into_candidates())
    }
}

fn build_report(
    coordinate: GeoCoordinate,
    station: TideStation,
    window: PredictionWindow,
    mut events: Vec<TideEvent>,
) -> TideReport {
    let received = events.len();
    events.retain(|event| window.contains(event.time));
    if events.len() != received {
        debug!(dropped = received - events.len(), "discarded events outside the window");
    }
    events.sort_by_key(|event| event.time);

    let distance_miles = coordinate.distance_miles(&station.location);
    info!(
        station = %station.id,
        name = %station.name,
        distance_miles,
        events = events.len(),
        "tide predictions ready"
    );
    TideReport {
        station_name: station.name,
        station_id: station.id,
        distance_miles,
        tides: events,
    }
}

fn as_upstream(err: SailError) -> SailError {
    match err {
        SailError::UpstreamUnavailable { .. } | SailError::Cancelled { .. } => err,
        other => SailError::upstream(SERVICE, other),
    }
}
