//! Periodic weather polling with cancellation and stale-result discard.
//!
//! The poller owns a background task that fetches current weather and
//! forecast for one location on a fixed cadence. Each [`watch`](WeatherPoller::watch)
//! call replaces the previous watch: the old task is cancelled before the
//! new one is spawned, so at most one timer is live at any time.
//!
//! Results from a superseded watch are discarded even if their fetch was
//! already in flight when the watch changed. An epoch counter is bumped on
//! every watch change and stop; a cycle publishes its results only if the
//! epoch still matches the one it started under.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use skycast_types::{ForecastDay, GeoPoint, ProviderId, WeatherSnapshot};

use crate::client::WeatherClient;
use crate::error::Error;
use crate::retry::{RetryConfig, with_retry};

/// Default forecast horizon in days.
pub const FORECAST_DAYS: u32 = 5;

/// Which of the two fetch operations a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Current,
    Forecast,
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchKind::Current => write!(f, "current weather"),
            FetchKind::Forecast => write!(f, "forecast"),
        }
    }
}

/// Events emitted by the polling task.
///
/// The two fetches of a cycle are published independently: one failing
/// does not suppress the other's result.
#[derive(Debug)]
pub enum PollEvent {
    /// A fresh current-weather snapshot.
    Current(WeatherSnapshot),
    /// A fresh forecast.
    Forecast(Vec<ForecastDay>),
    /// A fetch failed after its retry budget (if any) was spent.
    Failed { operation: FetchKind, error: Error },
}

/// Options for a polling watch.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Provider forwarded to the gateway on every fetch.
    pub provider: ProviderId,
    /// Time between polling cycles.
    pub interval: Duration,
    /// Forecast horizon in days.
    pub forecast_days: u32,
    /// Retry policy for forecast fetches. Current-weather fetches are
    /// always single-attempt.
    pub retry: RetryConfig,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            provider: ProviderId::default(),
            interval: skycast_types::PollInterval::default().as_duration(),
            forecast_days: FORECAST_DAYS,
            retry: RetryConfig::default(),
        }
    }
}

struct ActiveWatch {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// Schedules periodic weather fetches for a single watched location.
pub struct WeatherPoller {
    client: Arc<dyn WeatherClient>,
    events: mpsc::Sender<PollEvent>,
    epoch: Arc<AtomicU64>,
    active: Option<ActiveWatch>,
}

impl WeatherPoller {
    /// Create a poller publishing events to the given channel.
    pub fn new(client: Arc<dyn WeatherClient>, events: mpsc::Sender<PollEvent>) -> Self {
        Self {
            client,
            events,
            epoch: Arc::new(AtomicU64::new(0)),
            active: None,
        }
    }

    /// Start watching a location, replacing any previous watch.
    ///
    /// The first cycle runs immediately; subsequent cycles follow the
    /// configured interval. The previous watch (if any) is cancelled and
    /// its in-flight results invalidated before the new task is spawned.
    pub fn watch(&mut self, point: GeoPoint, options: PollOptions) {
        self.stop();

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let task_token = cancel.clone();
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let current_epoch = Arc::clone(&self.epoch);

        debug!(%point, interval = ?options.interval, "Starting weather watch");

        let handle = tokio::spawn(async move {
            let mut ticker = interval(options.interval);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("Watch cancelled, stopping");
                        break;
                    }
                    // First tick fires immediately
                    _ = ticker.tick() => {
                        run_cycle(&*client, &events, point, &options, epoch, &current_epoch).await;
                    }
                }
            }
        });

        self.active = Some(ActiveWatch { cancel, handle });
    }

    /// Stop the active watch, if any.
    ///
    /// Bumps the epoch so that results from fetches still in flight are
    /// discarded rather than published after the stop.
    pub fn stop(&mut self) {
        if let Some(watch) = self.active.take() {
            watch.cancel.cancel();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            // The task completes on its own; no need to await the handle
            drop(watch.handle);
        }
    }

    /// Whether a watch is currently active.
    pub fn is_polling(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|watch| !watch.handle.is_finished())
    }
}

impl Drop for WeatherPoller {
    fn drop(&mut self) {
        if let Some(watch) = self.active.take() {
            watch.cancel.cancel();
        }
    }
}

/// Run one polling cycle: fetch current weather and forecast concurrently,
/// publishing each result independently.
async fn run_cycle(
    client: &dyn WeatherClient,
    events: &mpsc::Sender<PollEvent>,
    point: GeoPoint,
    options: &PollOptions,
    epoch: u64,
    current_epoch: &AtomicU64,
) {
    // Each fetch publishes as soon as it resolves; the slower one never
    // delays the other's result.
    let current = async {
        match client.current_weather(point, options.provider).await {
            Ok(snapshot) => {
                publish(events, epoch, current_epoch, PollEvent::Current(snapshot)).await;
            }
            Err(error) => {
                warn!(%point, "Current weather fetch failed: {error}");
                let event = PollEvent::Failed {
                    operation: FetchKind::Current,
                    error,
                };
                publish(events, epoch, current_epoch, event).await;
            }
        }
    };

    let forecast = async {
        let result = with_retry(&options.retry, "forecast", || {
            client.forecast(point, options.forecast_days, options.provider)
        })
        .await;

        match result {
            Ok(days) => {
                publish(events, epoch, current_epoch, PollEvent::Forecast(days)).await;
            }
            Err(error) => {
                warn!(%point, "Forecast fetch failed: {error}");
                let event = PollEvent::Failed {
                    operation: FetchKind::Forecast,
                    error,
                };
                publish(events, epoch, current_epoch, event).await;
            }
        }
    };

    tokio::join!(current, forecast);
}

/// Send an event unless the watch that produced it has been superseded.
async fn publish(
    events: &mpsc::Sender<PollEvent>,
    epoch: u64,
    current_epoch: &AtomicU64,
    event: PollEvent,
) {
    if current_epoch.load(Ordering::SeqCst) != epoch {
        debug!("Discarding result from superseded watch");
        return;
    }

    if events.send(event).await.is_err() {
        debug!("Event receiver dropped");
    }
}
