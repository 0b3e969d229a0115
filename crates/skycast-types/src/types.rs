//! Core types for SkyCast weather data.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A geographic coordinate pair.
///
/// Two tracked cities are considered the same location when their
/// coordinates compare exactly equal; no rounding or distance threshold
/// is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, -90..=90.
    pub latitude: f64,
    /// Longitude in degrees, -180..=180.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated coordinate pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use skycast_types::GeoPoint;
    ///
    /// let point = GeoPoint::new(52.52, 13.405).unwrap();
    /// assert_eq!(point.latitude, 52.52);
    /// assert!(GeoPoint::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ParseError> {
        if !(-90.0..=90.0).contains(&latitude) || latitude.is_nan() {
            return Err(ParseError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) || longitude.is_nan() {
            return Err(ParseError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Upstream weather data source.
///
/// The provider only selects which upstream the gateway queries; the
/// domain schema is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// OpenWeatherMap (default).
    #[default]
    OpenWeather,
    /// WeatherAPI.com.
    WeatherApi,
}

impl ProviderId {
    /// Stable lowercase identifier used on the wire and in persistence.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    /// All supported providers.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(ParseError::UnknownProvider(s.to_string())),
        }
    }
}

/// Display unit for temperatures.
///
/// All core data is Celsius; conversion is a presentation concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    /// Degrees Celsius (default).
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Stable lowercase identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "celsius" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(ParseError::UnknownTemperatureUnit(s.to_string())),
        }
    }
}

/// Supported refresh cadences for the polling scheduler.
///
/// Persisted as the raw millisecond value; any other value is rejected on
/// load rather than rounded to the nearest option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
pub enum PollInterval {
    /// Refresh every 5 minutes.
    FiveMinutes,
    /// Refresh every 15 minutes.
    FifteenMinutes,
    /// Refresh every 30 minutes (default).
    #[default]
    ThirtyMinutes,
    /// Refresh every hour.
    OneHour,
}

impl PollInterval {
    /// Get the interval in milliseconds.
    #[must_use]
    pub fn as_millis(&self) -> u64 {
        match self {
            PollInterval::FiveMinutes => 5 * 60 * 1000,
            PollInterval::FifteenMinutes => 15 * 60 * 1000,
            PollInterval::ThirtyMinutes => 30 * 60 * 1000,
            PollInterval::OneHour => 60 * 60 * 1000,
        }
    }

    /// Get the interval as a [`std::time::Duration`].
    #[must_use]
    pub fn as_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.as_millis())
    }

    /// Try to create from a millisecond value.
    #[must_use]
    pub fn from_millis(millis: u64) -> Option<Self> {
        match millis {
            300_000 => Some(PollInterval::FiveMinutes),
            900_000 => Some(PollInterval::FifteenMinutes),
            1_800_000 => Some(PollInterval::ThirtyMinutes),
            3_600_000 => Some(PollInterval::OneHour),
            _ => None,
        }
    }

    /// All supported intervals, shortest first.
    pub const fn all() -> &'static [PollInterval] {
        &[
            PollInterval::FiveMinutes,
            PollInterval::FifteenMinutes,
            PollInterval::ThirtyMinutes,
            PollInterval::OneHour,
        ]
    }
}

impl From<PollInterval> for u64 {
    fn from(interval: PollInterval) -> Self {
        interval.as_millis()
    }
}

impl TryFrom<u64> for PollInterval {
    type Error = ParseError;

    fn try_from(millis: u64) -> Result<Self, Self::Error> {
        PollInterval::from_millis(millis).ok_or(ParseError::UnsupportedPollInterval(millis))
    }
}

/// A complete current-weather observation for one location.
///
/// Snapshots are immutable: a successful poll produces a fresh snapshot
/// that supersedes the previous one, never a partial merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity, 0-100.
    pub humidity: u8,
    /// Provider condition label, e.g. "Partly cloudy".
    pub condition: String,
    /// Wind speed in the provider's native unit.
    pub wind_speed: f64,
    /// Wind direction in degrees from north.
    pub wind_direction_deg: f64,
    /// UV index.
    pub uv_index: f64,
    /// Visibility in kilometres.
    pub visibility: f64,
    /// Estimated chance of rain, 0-100.
    pub rain_chance: u8,
    /// Country of the observed location.
    pub country: String,
    /// Forecast high for the day in °C.
    pub max_temp: f64,
    /// Forecast low for the day in °C.
    pub min_temp: f64,
}

/// One day of a multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO-8601 date, e.g. "2026-08-28".
    pub date: String,
    /// Headline temperature in °C. Equal to `max_temp` by convention.
    pub temperature: f64,
    /// Daily low in °C.
    pub min_temp: f64,
    /// Daily high in °C.
    pub max_temp: f64,
    /// Provider condition label.
    pub condition: String,
}

/// A city on the dashboard's tracked list.
///
/// The `last_*` fields are a rolled-up summary of the most recent
/// successful current-weather fetch; they are the only weather data that
/// is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedCity {
    /// Display name.
    pub name: String,
    /// Country of the city.
    pub country: String,
    /// Coordinates; unique across the tracked list.
    pub location: GeoPoint,
    /// Temperature from the last successful fetch, °C.
    pub last_temperature: f64,
    /// Condition label from the last successful fetch.
    pub last_condition: String,
    /// Rain chance from the last successful fetch, 0-100.
    pub last_rain_chance: u8,
}

/// User-configurable application settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Upstream weather provider.
    #[serde(default)]
    pub provider: ProviderId,
    /// Display unit for temperatures.
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
    /// Refresh cadence for the watched city.
    #[serde(default)]
    pub poll_interval: PollInterval,
}

/// The durable application state, restored at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedState {
    /// All tracked cities in display order.
    pub cities: Vec<TrackedCity>,
    /// The city currently shown on the main panel, if any.
    pub selected_city: Option<TrackedCity>,
    /// Application settings.
    pub settings: Settings,
}
