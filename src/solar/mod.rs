//! Sunrise and sunset in local time
//!
//! Solar events are computed locally with the `sunrise` crate. The local
//! timezone comes from a [`TimezoneSource`]; when that lookup fails the
//! offset is estimated from longitude (15 degrees per hour) and the result
//! is labelled [`APPROXIMATE_ZONE_ID`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tracing::{debug, instrument, warn};

use crate::context::RequestContext;
use crate::models::solar::{APPROXIMATE_ZONE_ID, LOCAL_TIME_FORMAT};
use crate::models::{CalendarDate, GeoCoordinate, SolarTimes};
use crate::{Result, SailError};

pub mod google;

pub use google::GoogleTimezoneClient;

const SERVICE: &str = "sunrise";
const SECONDS_PER_HOUR: i32 = 3600;

/// Timezone in effect at a point and instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    pub zone_id: String,
    pub zone_name: String,
    pub raw_offset_seconds: i32,
    pub dst_offset_seconds: i32,
}

impl ZoneInfo {
    /// Zone estimated from longitude alone
    #[must_use]
    pub fn approximate(longitude: f64) -> Self {
        let hours = (longitude / 15.0).round() as i32;
        Self {
            zone_id: APPROXIMATE_ZONE_ID.to_string(),
            zone_name: format!("UTC{hours:+}"),
            raw_offset_seconds: hours * SECONDS_PER_HOUR,
            dst_offset_seconds: 0,
        }
    }

    #[must_use]
    pub fn total_offset_seconds(&self) -> i32 {
        self.raw_offset_seconds + self.dst_offset_seconds
    }
}

#[async_trait]
pub trait TimezoneSource: Send + Sync {
    async fn lookup(&self, coordinate: GeoCoordinate, at: DateTime<Utc>) -> Result<ZoneInfo>;
}

pub struct SolarCalculator {
    timezone: Arc<dyn TimezoneSource>,
}

impl SolarCalculator {
    pub fn new(timezone: Arc<dyn TimezoneSource>) -> Self {
        Self { timezone }
    }

    /// Sunrise and sunset for `date`, rendered in the zone in effect on that date.
    ///
    /// The zone is looked up at midnight UTC of `date`, never at the current
    /// time, so daylight-saving rules match the requested day.
    #[instrument(skip(self, ctx), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn fetch_solar_times(
        &self,
        ctx: &RequestContext,
        coordinate: GeoCoordinate,
        date: &str,
    ) -> Result<SolarTimes> {
        let date = CalendarDate::parse(date)?;
        ctx.run("fetch_solar_times", self.compute(coordinate, date))
            .await
    }

    async fn compute(&self, coordinate: GeoCoordinate, date: CalendarDate) -> Result<SolarTimes> {
        let (sunrise, sunset) = solar_events(coordinate, date)?;

        let zone = match self.timezone.lookup(coordinate, date.start_utc()).await {
            Ok(zone) => zone,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(error = %e, "timezone lookup failed, estimating offset from longitude");
                ZoneInfo::approximate(coordinate.longitude)
            }
        };

        let offset_seconds = zone.total_offset_seconds();
        let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
            SailError::upstream(SERVICE, format!("utc offset out of range: {offset_seconds}s"))
        })?;
        debug!(zone = %zone.zone_id, offset_seconds, "resolved local timezone");

        Ok(SolarTimes {
            date: date.to_string(),
            sunrise: format_local(sunrise, offset),
            sunset: format_local(sunset, offset),
            time_zone: zone.zone_id,
            utc_offset_seconds: offset_seconds,
        })
    }
}

/// Sunrise and sunset instants, `NoData` during polar day or night
pub fn solar_events(
    coordinate: GeoCoordinate,
    date: CalendarDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let coordinates = Coordinates::new(coordinate.latitude, coordinate.longitude).ok_or_else(|| {
        SailError::invalid_coordinate(format!(
            "cannot compute solar events at {}",
            coordinate.format_coordinates()
        ))
    })?;

    let solar_day = SolarDay::new(coordinates, date.naive());
    let sunrise = solar_day.event_time(SolarEvent::Sunrise);
    let sunset = solar_day.event_time(SolarEvent::Sunset);

    match (sunrise, sunset) {
        (Some(sunrise), Some(sunset)) => Ok((sunrise, sunset)),
        _ => Err(SailError::no_data(SERVICE, date.to_string())),
    }
}

fn format_local(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format(LOCAL_TIME_FORMAT)
        .to_string()
}
