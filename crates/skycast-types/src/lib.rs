//! Platform-agnostic domain types for the SkyCast weather dashboard core.
//!
//! This crate defines the data model shared by every SkyCast crate:
//! coordinates, providers, snapshots, the tracked-city list, and the
//! persisted settings. It performs no I/O.
//!
//! All temperatures are Celsius internally; unit conversion is a
//! presentation concern and happens outside the core.

pub mod error;
pub mod types;

pub use error::ParseError;
pub use types::{
    ForecastDay, GeoPoint, PersistedState, PollInterval, ProviderId, Settings, TemperatureUnit,
    TrackedCity, WeatherSnapshot,
};
