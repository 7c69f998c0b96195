//! Data models for the conditions fetchers
//!
//! This module contains the core domain models organized by concern:
//! - Location: validated geographic coordinates
//! - Date: request dates in `YYYY-MM-DD` form
//! - Weather: daily weather and marine records
//! - Tides: stations and high/low events
//! - Solar: sunrise/sunset in local time

pub mod date;
pub mod location;
pub mod solar;
pub mod tides;
pub mod weather;

// Re-export all public types for convenient access
pub use date::CalendarDate;
pub use location::GeoCoordinate;
pub use solar::SolarTimes;
pub use tides::{TideEvent, TideKind, TideReport, TideStation};
pub use weather::{ForecastType, MarineRecord, WeatherRecord, WeatherReport};
