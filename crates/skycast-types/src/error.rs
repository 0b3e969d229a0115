//! Validation errors for SkyCast domain types.

use thiserror::Error;

/// Errors produced when constructing or parsing domain values.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Latitude outside the valid [-90, 90] range.
    #[error("Latitude out of range: {0} (expected -90..=90)")]
    LatitudeOutOfRange(f64),

    /// Longitude outside the valid [-180, 180] range.
    #[error("Longitude out of range: {0} (expected -180..=180)")]
    LongitudeOutOfRange(f64),

    /// Unknown weather provider name.
    #[error("Unknown provider '{0}'. Supported providers: openweather, weatherapi")]
    UnknownProvider(String),

    /// Unknown temperature unit name.
    #[error("Unknown temperature unit '{0}'. Supported units: celsius, fahrenheit")]
    UnknownTemperatureUnit(String),

    /// Millisecond value that does not match a supported poll interval.
    #[error("Unsupported poll interval: {0} ms")]
    UnsupportedPollInterval(u64),
}
