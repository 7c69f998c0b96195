//! Configuration management for the conditions fetchers
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SailError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SailConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub tides: TidesConfig,
    #[serde(default)]
    pub timezone: TimezoneConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Outbound HTTP settings shared by every upstream client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures; 0 surfaces failures immediately
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Deadline for one whole fetch in seconds; 0 disables it
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u32,
}

/// Open-Meteo endpoints and forecast-mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_seasonal_url")]
    pub seasonal_url: String,
    #[serde(default = "default_marine_url")]
    pub marine_url: String,
    /// Dates further out than this many days use the seasonal forecast
    #[serde(default = "default_seasonal_threshold")]
    pub seasonal_threshold_days: u32,
}

/// NOAA CO-OPS endpoints and station search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidesConfig {
    #[serde(default = "default_stations_url")]
    pub stations_url: String,
    #[serde(default = "default_predictions_url")]
    pub predictions_url: String,
    /// First search radius and radius increment, in miles
    #[serde(default = "default_min_radius")]
    pub min_radius_miles: u32,
    /// Largest radius as a multiple of `min_radius_miles`
    #[serde(default = "default_radius_multiplier")]
    pub radius_multiplier: u32,
    /// Nearest stations tried for predictions
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Application name reported to NOAA
    #[serde(default = "default_application")]
    pub application: String,
}

/// Google Time Zone API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    #[serde(default = "default_timezone_url")]
    pub base_url: String,
    /// Maps API key; without one every lookup falls back to Local Mean Time
    pub api_key: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_http_timeout() -> u32 {
    30
}

fn default_deadline() -> u32 {
    60
}

fn default_user_agent() -> String {
    format!("sail-conditions/{}", crate::VERSION)
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_seasonal_url() -> String {
    "https://seasonal-api.open-meteo.com/v1/seasonal".to_string()
}

fn default_marine_url() -> String {
    "https://marine-api.open-meteo.com/v1/marine".to_string()
}

fn default_seasonal_threshold() -> u32 {
    14
}

fn default_stations_url() -> String {
    "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations.json".to_string()
}

fn default_predictions_url() -> String {
    "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string()
}

fn default_min_radius() -> u32 {
    50
}

fn default_radius_multiplier() -> u32 {
    10
}

fn default_max_candidates() -> usize {
    5
}

fn default_application() -> String {
    "sail_conditions".to_string()
}

fn default_timezone_url() -> String {
    "https://maps.googleapis.com/maps/api/timezone/json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_retries: 0,
            user_agent: default_user_agent(),
            deadline_seconds: default_deadline(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            seasonal_url: default_seasonal_url(),
            marine_url: default_marine_url(),
            seasonal_threshold_days: default_seasonal_threshold(),
        }
    }
}

impl Default for TidesConfig {
    fn default() -> Self {
        Self {
            stations_url: default_stations_url(),
            predictions_url: default_predictions_url(),
            min_radius_miles: default_min_radius(),
            radius_multiplier: default_radius_multiplier(),
            max_candidates: default_max_candidates(),
            application: default_application(),
        }
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            base_url: default_timezone_url(),
            api_key: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SailConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SAIL__TIMEZONE__API_KEY -> timezone.api_key
        builder = builder.add_source(
            Environment::with_prefix("SAIL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SailConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.timezone.api_key.is_none() {
            config.timezone.api_key = std::env::var("GOOGLE_MAPS_KEY").ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sail-conditions").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.tides.min_radius_miles == 0 {
            self.tides.min_radius_miles = default_min_radius();
        }
        if self.tides.max_candidates == 0 {
            self.tides.max_candidates = default_max_candidates();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self
            .timezone
            .api_key
            .as_ref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.timezone.api_key = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(SailError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        if self.http.deadline_seconds > 600 {
            return Err(SailError::config("Request deadline cannot exceed 600 seconds").into());
        }

        if self.http.max_retries > 10 {
            return Err(SailError::config("HTTP max retries cannot exceed 10").into());
        }

        if self.weather.seasonal_threshold_days > 366 {
            return Err(SailError::config("Seasonal threshold cannot exceed 366 days").into());
        }

        if self.tides.radius_multiplier == 0 {
            return Err(SailError::config("Tide radius multiplier must be at least 1").into());
        }

        if self.tides.max_candidates > 50 {
            return Err(SailError::config("Tide station candidates cannot exceed 50").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SailError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SailError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("weather.forecast_url", &self.weather.forecast_url),
            ("weather.seasonal_url", &self.weather.seasonal_url),
            ("weather.marine_url", &self.weather.marine_url),
            ("tides.stations_url", &self.tides.stations_url),
            ("tides.predictions_url", &self.tides.predictions_url),
            ("timezone.base_url", &self.timezone.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    SailError::config(format!("{name} must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }

        Ok(())
    }
}
