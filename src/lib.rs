//! `sail-conditions` - Sailing conditions for a location and date
//!
//! This library fetches a daily weather and sea-state forecast, nearby tide
//! predictions, and local sunrise/sunset times from public upstream APIs.

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod service;
pub mod solar;
pub mod tides;
pub mod units;
pub mod weather;

// Re-export core types for public API
pub use config::SailConfig;
pub use context::RequestContext;
pub use error::SailError;
pub use models::{
    CalendarDate, GeoCoordinate, SolarTimes, TideEvent, TideReport, WeatherReport,
};
pub use service::{ConditionsReport, ConditionsService};
pub use solar::{SolarCalculator, TimezoneSource};
pub use tides::{TideResolver, TideSource};
pub use weather::{ForecastSource, WeatherAggregator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SailError>;
