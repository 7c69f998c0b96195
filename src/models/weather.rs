//! Weather and marine records returned by the weather aggregator

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CalendarDate;

/// How precise the daily forecast is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastType {
    /// Short-range deterministic forecast
    Standard,
    /// Climatological / seasonal approximation for far-future dates
    Seasonal,
}

impl ForecastType {
    /// Pick the forecast mode for a date: `Seasonal` once the start of the
    /// date lies more than `threshold_days` after `now`.
    #[must_use]
    pub fn for_date(date: CalendarDate, now: DateTime<Utc>, threshold_days: u32) -> Self {
        let seconds_until = (date.start_utc() - now).num_seconds() as f64;
        let days_until = seconds_until / 86_400.0;
        if days_until > f64::from(threshold_days) {
            ForecastType::Seasonal
        } else {
            ForecastType::Standard
        }
    }
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastType::Standard => write!(f, "Standard"),
            ForecastType::Seasonal => write!(f, "Seasonal"),
        }
    }
}

/// Daily weather summary for one location and date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Date reported by the upstream series
    pub date: String,
    /// Human-readable condition derived from the WMO weather code
    pub condition: String,
    pub forecast_type: ForecastType,
    /// Daily maximum temperature in °F
    #[serde(rename = "max_temp")]
    pub max_temp_f: f64,
    /// Daily minimum temperature in °F
    #[serde(rename = "min_temp")]
    pub min_temp_f: f64,
    pub max_wind_kts: f64,
    pub max_gusts_kts: f64,
    /// Dominant wind direction in whole degrees
    #[serde(rename = "wind_dir_deg")]
    pub wind_direction_deg: u16,
    /// 16-point compass label for `wind_direction_deg`
    pub wind_direction: String,
    /// Precipitation total for the day
    #[serde(rename = "precip_total")]
    pub precipitation_total: f64,
}

/// Daily sea state. All zero and `available == false` when the marine
/// forecast could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarineRecord {
    #[serde(rename = "wave_height")]
    pub wave_height_ft: f64,
    #[serde(rename = "wave_direction")]
    pub wave_direction_deg: f64,
    #[serde(rename = "wave_period")]
    pub wave_period_s: f64,
    #[serde(rename = "marine_available")]
    pub available: bool,
}

impl MarineRecord {
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Result of a successful weather fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(flatten)]
    pub weather: WeatherRecord,
    #[serde(flatten)]
    pub marine: MarineRecord,
    pub debug_duration_ms: u64,
}

impl WeatherReport {
    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!(
            "{:.0} kts {} ({}°), gusts {:.0} kts",
            self.weather.max_wind_kts,
            self.weather.wind_direction,
            self.weather.wind_direction_deg,
            self.weather.max_gusts_kts
        )
    }

    /// Format sea state, or a note when it is not available
    #[must_use]
    pub fn format_sea_state(&self) -> String {
        if self.marine.available {
            format!(
                "{:.1} ft @ {:.0}s from {:.0}°",
                self.marine.wave_height_ft, self.marine.wave_period_s, self.marine.wave_direction_deg
            )
        } else {
            "sea state unavailable".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn near_dates_are_standard() {
        let date = CalendarDate::parse("2025-01-10").unwrap();
        assert_eq!(ForecastType::for_date(date, now(), 14), ForecastType::Standard);

        let past = CalendarDate::parse("2024-06-01").unwrap();
        assert_eq!(ForecastType::for_date(past, now(), 14), ForecastType::Standard);
    }

    #[test]
    fn far_dates_are_seasonal() {
        let date = CalendarDate::parse("2025-02-15").unwrap();
        assert_eq!(ForecastType::for_date(date, now(), 14), ForecastType::Seasonal);
    }

    #[test]
    fn threshold_is_exclusive() {
        // 2025-01-15T00:00Z is 13.5 days after noon on 2025-01-01
        let inside = CalendarDate::parse("2025-01-15").unwrap();
        assert_eq!(ForecastType::for_date(inside, now(), 14), ForecastType::Standard);
        // 2025-01-16T00:00Z is 14.5 days away
        let outside = CalendarDate::parse("2025-01-16").unwrap();
        assert_eq!(ForecastType::for_date(outside, now(), 14), ForecastType::Seasonal);
    }

    #[test]
    fn report_serializes_flat_fields() {
        let report = WeatherReport {
            weather: WeatherRecord {
                date: "2025-01-01".into(),
                condition: "Mainly clear".into(),
                forecast_type: ForecastType::Standard,
                max_temp_f: 75.0,
                min_temp_f: 65.0,
                max_wind_kts: 15.0,
                max_gusts_kts: 20.0,
                wind_direction_deg: 90,
                wind_direction: "E".into(),
                precipitation_total: 0.1,
            },
            marine: MarineRecord::unavailable(),
            debug_duration_ms: 12,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["forecast_type"], "Standard");
        assert_eq!(json["wind_dir_deg"], 90);
        assert_eq!(json["wave_height"], 0.0);
        assert_eq!(json["marine_available"], false);
        assert_eq!(report.format_sea_state(), "sea state unavailable");
        assert_eq!(report.format_wind(), "15 kts E (90°), gusts 20 kts");
    }
}
