//! Wiring of the three fetchers behind one entry point

use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument};

use crate::config::SailConfig;
use crate::context::RequestContext;
use crate::http::build_client;
use crate::models::{GeoCoordinate, SolarTimes, TideReport, WeatherReport};
use crate::solar::{GoogleTimezoneClient, SolarCalculator};
use crate::tides::{NoaaClient, TideResolver};
use crate::weather::{OpenMeteoClient, WeatherAggregator};
use crate::{Result, SailError};

/// Outcome of every fetcher for one location and date
#[derive(Debug, Serialize)]
pub struct ConditionsReport {
    pub location: GeoCoordinate,
    pub date: String,
    #[serde(serialize_with = "outcome")]
    pub weather: Result<WeatherReport>,
    #[serde(serialize_with = "outcome")]
    pub tides: Result<TideReport>,
    #[serde(serialize_with = "outcome")]
    pub solar: Result<SolarTimes>,
}

impl ConditionsReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.weather.is_ok() && self.tides.is_ok() && self.solar.is_ok()
    }
}

#[derive(Serialize)]
struct ErrorOutcome {
    error: String,
    message: String,
}

/// Successful outcomes serialize as their data, failures as `{error, message}`
fn outcome<T: Serialize, S: Serializer>(
    result: &Result<T>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match result {
        Ok(value) => value.serialize(serializer),
        Err(e) => ErrorOutcome {
            error: e.to_string(),
            message: e.user_message(),
        }
        .serialize(serializer),
    }
}

pub struct ConditionsService {
    weather: WeatherAggregator,
    tides: TideResolver,
    solar: SolarCalculator,
    deadline: Option<Duration>,
}

impl ConditionsService {
    pub fn new(weather: WeatherAggregator, tides: TideResolver, solar: SolarCalculator) -> Self {
        Self {
            weather,
            tides,
            solar,
            deadline: None,
        }
    }

    /// Build the production clients from configuration
    pub fn from_config(config: &SailConfig) -> Result<Self> {
        let client = build_client(&config.http)?;

        let weather = WeatherAggregator::new(Arc::new(OpenMeteoClient::new(
            client.clone(),
            &config.weather,
        )))
        .with_seasonal_threshold(config.weather.seasonal_threshold_days);

        let tides = TideResolver::new(Arc::new(NoaaClient::new(client.clone(), &config.tides)))
            .with_search(
                config.tides.min_radius_miles,
                config.tides.radius_multiplier,
                config.tides.max_candidates,
            );

        let solar = SolarCalculator::new(Arc::new(GoogleTimezoneClient::new(
            client,
            &config.timezone,
        )));

        let deadline = (config.http.deadline_seconds > 0)
            .then(|| Duration::from_secs(config.http.deadline_seconds.into()));

        Ok(Self::new(weather, tides, solar).with_deadline(deadline))
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn weather(&self) -> &WeatherAggregator {
        &self.weather
    }

    #[must_use]
    pub fn tides(&self) -> &TideResolver {
        &self.tides
    }

    #[must_use]
    pub fn solar(&self) -> &SolarCalculator {
        &self.solar
    }

    /// A fresh context carrying the configured deadline
    #[must_use]
    pub fn context(&self) -> RequestContext {
        self.deadline
            .map_or_else(RequestContext::background, RequestContext::with_timeout)
    }

    /// Run all three fetchers concurrently; each outcome is reported on its own
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, latitude: f64, longitude: f64, date: &str) -> Result<ConditionsReport> {
        let location = GeoCoordinate::new(latitude, longitude)?;
        let ctx = self.context();
        debug!(
            deadline_ms = ctx.remaining().map(|left| left.as_millis() as u64),
            "fetching weather, tides and solar times"
        );

        let (weather, tides, solar) = tokio::join!(
            self.weather.fetch_weather(&ctx, location, date),
            self.tides.fetch_tides(&ctx, location, date),
            self.solar.fetch_solar_times(&ctx, location, date),
        );

        // a malformed date fails every fetcher the same way
        if let Err(SailError::InvalidDate { input }) = &weather {
            return Err(SailError::invalid_date(input.clone()));
        }

        let report = ConditionsReport {
            location,
            date: date.trim().to_string(),
            weather,
            tides,
            solar,
        };
        info!(complete = report.is_complete(), "conditions fetched");
        Ok(report)
    }
}
