//! Unit conversions and compass bearings

/// Feet per meter
pub const METERS_TO_FEET: f64 = 3.28084;

/// Knots per kilometer-per-hour
pub const KMH_TO_KNOTS: f64 = 1.0 / 1.852;

/// 16-point compass rose, clockwise from north
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEGREES: f64 = 360.0 / 16.0;

#[must_use]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * METERS_TO_FEET
}

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[must_use]
pub fn kmh_to_knots(kmh: f64) -> f64 {
    kmh * KMH_TO_KNOTS
}

/// Convert a bearing in degrees to a 16-point compass label.
///
/// The sector index is `round(degrees / 22.5) mod 16` with ties rounded
/// up, so a bearing exactly on a sector boundary (11.25, 33.75, ...) takes
/// the clockwise label. Bearings outside 0..360 are wrapped first; a NaN
/// bearing maps to "N".
#[must_use]
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    let wrapped = degrees.rem_euclid(360.0);
    let index = (wrapped / SECTOR_DEGREES + 0.5).floor() as usize;
    COMPASS_POINTS[index % COMPASS_POINTS.len()]
}
