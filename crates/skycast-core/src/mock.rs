//! Mock gateway client for testing.
//!
//! [`MockWeatherClient`] implements the [`WeatherClient`] trait, allowing
//! it to be used interchangeably with the real gateway client in polling
//! and dashboard code.
//!
//! # Features
//!
//! - **Failure injection**: fail the next N calls with a chosen status code
//! - **Latency simulation**: add artificial delay to simulate slow fetches
//! - **Call counting**: atomics-based attempt observation for retry tests

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use skycast_types::{ForecastDay, GeoPoint, ProviderId, WeatherSnapshot};

use crate::client::WeatherClient;
use crate::error::{Error, Result};

/// A mock weather gateway for testing.
pub struct MockWeatherClient {
    current: RwLock<WeatherSnapshot>,
    forecast: RwLock<Vec<ForecastDay>>,
    current_calls: AtomicU32,
    forecast_calls: AtomicU32,
    /// Status code used for injected failures.
    fail_code: AtomicU32,
    /// Number of calls left to fail before succeeding again.
    remaining_failures: AtomicU32,
    /// When set, every call fails regardless of `remaining_failures`.
    always_fail: AtomicBool,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
}

impl std::fmt::Debug for MockWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockWeatherClient")
            .field("current_calls", &self.current_calls.load(Ordering::Relaxed))
            .field(
                "forecast_calls",
                &self.forecast_calls.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl Default for MockWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWeatherClient {
    /// Create a mock with default canned data.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Self::default_snapshot()),
            forecast: RwLock::new(Self::default_forecast()),
            current_calls: AtomicU32::new(0),
            forecast_calls: AtomicU32::new(0),
            fail_code: AtomicU32::new(0),
            remaining_failures: AtomicU32::new(0),
            always_fail: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// A plausible current-weather snapshot.
    pub fn default_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 21.5,
            humidity: 55,
            condition: "Partly cloudy".to_string(),
            wind_speed: 3.4,
            wind_direction_deg: 225.0,
            uv_index: 4.0,
            visibility: 10.0,
            rain_chance: 20,
            country: "DE".to_string(),
            max_temp: 24.0,
            min_temp: 14.0,
        }
    }

    /// A plausible five-day forecast.
    pub fn default_forecast() -> Vec<ForecastDay> {
        (0..5)
            .map(|i| ForecastDay {
                date: format!("2026-08-{:02}", 28 + i),
                temperature: 24.0 - i as f64,
                min_temp: 14.0 - i as f64,
                max_temp: 24.0 - i as f64,
                condition: "Partly cloudy".to_string(),
            })
            .collect()
    }

    /// Replace the canned current-weather snapshot.
    pub async fn set_current(&self, snapshot: WeatherSnapshot) {
        *self.current.write().await = snapshot;
    }

    /// Replace the canned forecast.
    pub async fn set_forecast(&self, forecast: Vec<ForecastDay>) {
        *self.forecast.write().await = forecast;
    }

    /// Fail the next `count` calls with the given status code.
    pub fn fail_next(&self, count: u32, code: u32) {
        self.fail_code.store(code, Ordering::SeqCst);
        self.remaining_failures.store(count, Ordering::SeqCst);
    }

    /// Fail every call with the given status code until cleared.
    pub fn always_fail(&self, code: u32) {
        self.fail_code.store(code, Ordering::SeqCst);
        self.always_fail.store(true, Ordering::SeqCst);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.always_fail.store(false, Ordering::SeqCst);
        self.remaining_failures.store(0, Ordering::SeqCst);
    }

    /// Simulate slow fetches.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of current-weather calls made so far.
    pub fn current_calls(&self) -> u32 {
        self.current_calls.load(Ordering::SeqCst)
    }

    /// Number of forecast calls made so far.
    pub fn forecast_calls(&self) -> u32 {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    async fn simulate(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.always_fail.load(Ordering::SeqCst) {
            return Err(self.injected_error());
        }

        // Consume one scripted failure, if any remain
        let consumed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            return Err(self.injected_error());
        }

        Ok(())
    }

    fn injected_error(&self) -> Error {
        Error::Service {
            code: self.fail_code.load(Ordering::SeqCst),
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl WeatherClient for MockWeatherClient {
    async fn current_weather(
        &self,
        _point: GeoPoint,
        _provider: ProviderId,
    ) -> Result<WeatherSnapshot> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        Ok(self.current.read().await.clone())
    }

    async fn forecast(
        &self,
        _point: GeoPoint,
        _days: u32,
        _provider: ProviderId,
    ) -> Result<Vec<ForecastDay>> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;
        Ok(self.forecast.read().await.clone())
    }
}
