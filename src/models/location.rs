//! Geographic coordinate model

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

use crate::{Result, SailError};

/// A validated point on the globe, supplied by the caller per request
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    /// Latitude in decimal degrees, -90..=90
    pub latitude: f64,
    /// Longitude in decimal degrees, -180..=180
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SailError::invalid_coordinate(format!(
                "latitude {latitude} is outside -90..=90"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SailError::invalid_coordinate(format!(
                "longitude {longitude} is outside -180..=180"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to another point in statute miles
    #[must_use]
    pub fn distance_miles(&self, other: &GeoCoordinate) -> f64 {
        distance(self.to_haversine(), other.to_haversine(), Units::Miles)
    }

    /// Format as `lat,lng` with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }

    fn to_haversine(self) -> HaversineLocation {
        HaversineLocation {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
