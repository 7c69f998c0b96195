//! Sunrise/sunset result model

use serde::{Deserialize, Serialize};

/// Local wall-clock layout for sunrise and sunset (no UTC offset suffix)
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Timezone label used when the real zone could not be resolved
pub const APPROXIMATE_ZONE_ID: &str = "LMT (Approximate)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTimes {
    pub date: String,
    /// Local sunrise, formatted with [`LOCAL_TIME_FORMAT`]
    pub sunrise: String,
    /// Local sunset, formatted with [`LOCAL_TIME_FORMAT`]
    pub sunset: String,
    /// IANA zone id, or [`APPROXIMATE_ZONE_ID`] for the longitude fallback
    pub time_zone: String,
    /// Total UTC offset applied to both times, in seconds
    pub utc_offset_seconds: i32,
}

impl SolarTimes {
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        self.time_zone == APPROXIMATE_ZONE_ID
    }
}
