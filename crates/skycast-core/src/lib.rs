//! Core data-acquisition library for the SkyCast weather dashboard.
//!
//! This crate talks to the SkyCast weather gateway over HTTP and keeps a
//! dashboard's view of the world fresh and durable.
//!
//! # Features
//!
//! - **Gateway client**: Current weather and multi-day forecast fetches
//! - **Client identity**: Stable per-installation token for attribution
//! - **Retry**: Linear backoff for transient upstream outages
//! - **Polling**: Interval-driven refresh with cancellation and
//!   stale-result discard
//! - **Dashboard state**: Tracked cities, selection, and settings, all
//!   persisted across restarts
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use skycast_core::{Dashboard, PollEvent, ServiceClient, client_id};
//! use skycast_store::{SqliteStorage, Storage};
//! use skycast_types::GeoPoint;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_default()?);
//!     let token = client_id::get_or_create(storage.as_ref());
//!     let client = Arc::new(ServiceClient::new("http://localhost:8080", token)?);
//!
//!     let (mut dashboard, mut events) = Dashboard::new(client, storage, 32);
//!     dashboard.add_city("Berlin", "DE", GeoPoint::new(52.52, 13.405)?).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         if let PollEvent::Current(snapshot) = event {
//!             println!("{}: {:.1}°C", snapshot.condition, snapshot.temperature);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod client_id;
pub mod dashboard;
pub mod error;
pub mod mock;
pub mod poller;
pub mod rain;
pub mod retry;

pub use client::{ServiceClient, WeatherClient};
pub use dashboard::Dashboard;
pub use error::{Error, Result, STATUS_UNAVAILABLE, STATUS_UNKNOWN};
pub use mock::MockWeatherClient;
pub use poller::{FORECAST_DAYS, FetchKind, PollEvent, PollOptions, WeatherPoller};
pub use rain::estimate_rain_chance;
pub use retry::{RetryConfig, with_retry};

// Re-export from skycast-types
pub use skycast_types::{
    ForecastDay, GeoPoint, PollInterval, ProviderId, Settings, TemperatureUnit, TrackedCity,
    WeatherSnapshot,
};
