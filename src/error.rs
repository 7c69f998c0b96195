//! Error types and handling for the conditions fetchers

use thiserror::Error;

/// Boxed cause carried by [`SailError::UpstreamUnavailable`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the weather, tide and solar fetchers
#[derive(Error, Debug)]
pub enum SailError {
    /// The date string is not a valid `YYYY-MM-DD` calendar date
    #[error("invalid date format: {input:?} (expected YYYY-MM-DD)")]
    InvalidDate { input: String },

    /// Latitude or longitude outside the valid range
    #[error("invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// A searched-for resource (e.g. a tide station) does not exist
    #[error("resource not found: {what}")]
    NotFound { what: String },

    /// A required upstream call failed after being attempted
    #[error("external API error ({service}): {source}")]
    UpstreamUnavailable {
        service: &'static str,
        #[source]
        source: BoxError,
    },

    /// The upstream answered but had nothing for the requested date
    #[error("no data returned by {service} for {date}")]
    NoData { service: &'static str, date: String },

    /// The caller's deadline elapsed before the operation finished
    #[error("operation cancelled: {operation} exceeded its deadline")]
    Cancelled { operation: &'static str },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SailError {
    /// Create a new invalid date error
    pub fn invalid_date<S: Into<String>>(input: S) -> Self {
        Self::InvalidDate {
            input: input.into(),
        }
    }

    /// Create a new invalid coordinate error
    pub fn invalid_coordinate<S: Into<String>>(message: S) -> Self {
        Self::InvalidCoordinate {
            message: message.into(),
        }
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Wrap an upstream failure for the named service
    pub fn upstream<E: Into<BoxError>>(service: &'static str, source: E) -> Self {
        Self::UpstreamUnavailable {
            service,
            source: source.into(),
        }
    }

    /// Create a new no-data error
    pub fn no_data<S: Into<String>>(service: &'static str, date: S) -> Self {
        Self::NoData {
            service,
            date: date.into(),
        }
    }

    /// Create a new cancellation error
    #[must_use]
    pub fn cancelled(operation: &'static str) -> Self {
        Self::Cancelled { operation }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SailError::Cancelled { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SailError::InvalidDate { input } => {
                format!("'{input}' is not a valid date. Please use the YYYY-MM-DD format.")
            }
            SailError::InvalidCoordinate { message } => format!("Invalid location: {message}"),
            SailError::NotFound { what } => format!("Nothing found: {what}"),
            SailError::UpstreamUnavailable { service, .. } => {
                format!("The {service} service is currently unavailable. Please try again later.")
            }
            SailError::NoData { service, date } => {
                format!("The {service} service has no data for {date}.")
            }
            SailError::Cancelled { .. } => {
                "The request took too long and was cancelled.".to_string()
            }
            SailError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}
