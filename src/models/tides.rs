//! Tide station and tide event models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::GeoCoordinate;

/// Timestamp layout used for tide events (station-local wall clock)
pub const TIDE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A fixed tide-observation point discovered by the station search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideStation {
    pub id: String,
    pub name: String,
    pub location: GeoCoordinate,
}

/// High or low water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    /// Parse the NOAA high/low marker (`H`, `L`, and the mixed-tide `HH`/`LL`)
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "H" | "HH" => Some(TideKind::High),
            "L" | "LL" => Some(TideKind::Low),
            _ => None,
        }
    }
}

/// One predicted high or low tide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    #[serde(with = "tide_time")]
    pub time: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: TideKind,
    pub height_ft: f64,
    pub unit: String,
}

impl TideEvent {
    #[must_use]
    pub fn new(time: NaiveDateTime, kind: TideKind, height_ft: f64) -> Self {
        Self {
            time,
            kind,
            height_ft,
            unit: "ft".to_string(),
        }
    }
}

/// Result of a successful tide fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideReport {
    pub station_name: String,
    pub station_id: String,
    /// Distance from the requested coordinate to the station
    pub distance_miles: f64,
    /// Events ordered by time across the buffered window
    pub tides: Vec<TideEvent>,
}

mod tide_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIDE_TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(TIDE_TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIDE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
