//! Integration tests for skycast-core
//!
//! These tests exercise the full stack (dashboard, poller, retry, and
//! persistence) against the mock gateway client and in-memory storage,
//! with tokio's paused clock driving the polling cadence.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::yield_now;
use tokio::time::advance;

use skycast_core::{
    Dashboard, GeoPoint, MockWeatherClient, PollEvent, PollInterval, ProviderId, STATUS_UNAVAILABLE,
    WeatherClient,
};
use skycast_store::{MemoryStorage, StateStore, Storage};

fn berlin() -> GeoPoint {
    GeoPoint::new(52.52, 13.405).unwrap()
}

/// Let spawned tasks make progress without advancing the paused clock.
async fn settle() {
    for _ in 0..50 {
        yield_now().await;
    }
}

fn dashboard_over(
    storage: Arc<MemoryStorage>,
) -> (Arc<MockWeatherClient>, Dashboard, mpsc::Receiver<PollEvent>) {
    let mock = Arc::new(MockWeatherClient::new());
    let (dashboard, rx) = Dashboard::new(Arc::clone(&mock) as Arc<dyn WeatherClient>, storage, 32);
    (mock, dashboard, rx)
}

#[tokio::test(start_paused = true)]
async fn test_add_watch_and_receive_events() {
    let (_, mut dashboard, mut rx) = dashboard_over(Arc::new(MemoryStorage::new()));

    dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
    settle().await;

    // The immediate cycle delivers both fetches
    let mut saw_current = false;
    let mut saw_forecast = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            PollEvent::Current(snapshot) => {
                assert!(snapshot.rain_chance <= 100);
                saw_current = true;
            }
            PollEvent::Forecast(days) => {
                assert_eq!(days.len(), 5);
                saw_forecast = true;
            }
            PollEvent::Failed { .. } => panic!("unexpected failure"),
        }
    }
    assert!(saw_current && saw_forecast);

    // The next cycle follows the default 30-minute cadence
    advance(PollInterval::ThirtyMinutes.as_duration()).await;
    settle().await;
    assert!(matches!(rx.try_recv(), Ok(PollEvent::Current(_))));
}

#[tokio::test(start_paused = true)]
async fn test_restart_restores_state_and_resumes_polling() {
    let storage = Arc::new(MemoryStorage::new());

    {
        let (_, mut dashboard, mut rx) = dashboard_over(storage.clone());
        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
        dashboard.set_provider(ProviderId::WeatherApi);
        dashboard.set_poll_interval(PollInterval::FiveMinutes);
        settle().await;

        // Fold a fresh snapshot into the rollup before "shutdown"
        let mut snapshot = MockWeatherClient::default_snapshot();
        snapshot.temperature = 30.5;
        snapshot.condition = "Sunny".to_string();
        snapshot.rain_chance = 0;
        dashboard.apply_current(&snapshot);
        while rx.try_recv().is_ok() {}
    }

    let (mock, mut dashboard, mut rx) = dashboard_over(storage);
    let city = dashboard.selected_city().expect("selection restored");
    assert_eq!(city.name, "Berlin");
    assert_eq!(city.last_temperature, 30.5);
    assert_eq!(city.last_condition, "Sunny");
    assert_eq!(dashboard.settings().provider, ProviderId::WeatherApi);
    assert_eq!(dashboard.settings().poll_interval, PollInterval::FiveMinutes);

    // Restoration alone does not poll; resume does
    settle().await;
    assert_eq!(mock.current_calls(), 0);

    dashboard.resume();
    settle().await;
    assert_eq!(mock.current_calls(), 1);
    assert!(matches!(rx.try_recv(), Ok(PollEvent::Current(_))));

    // And the restored five-minute cadence applies
    advance(PollInterval::FiveMinutes.as_duration()).await;
    settle().await;
    assert_eq!(mock.current_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transient_outage_recovers_within_one_cycle() {
    let (mock, mut dashboard, mut rx) = dashboard_over(Arc::new(MemoryStorage::new()));

    dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
    settle().await;
    while rx.try_recv().is_ok() {}

    // Two transient failures, then the gateway recovers
    mock.fail_next(2, STATUS_UNAVAILABLE);
    advance(PollInterval::ThirtyMinutes.as_duration()).await;
    settle().await;
    // Let the forecast retry's backoff elapse so the cycle completes
    advance(Duration::from_secs(1)).await;
    settle().await;

    // Current weather spent one injected failure on its single attempt;
    // forecast ate the other and succeeded on its retry
    assert!(matches!(rx.try_recv(), Ok(PollEvent::Failed { .. })));
    assert!(matches!(rx.try_recv(), Ok(PollEvent::Forecast(_))));
}

#[tokio::test(start_paused = true)]
async fn test_rollup_is_visible_to_an_independent_reader() {
    let storage = Arc::new(MemoryStorage::new());
    let (_, mut dashboard, _rx) = dashboard_over(storage.clone());

    dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();

    // A second StateStore over the same storage sees the persisted city
    let state = StateStore::new(storage as Arc<dyn Storage>).load();
    assert_eq!(state.cities.len(), 1);
    assert_eq!(state.cities[0].name, "Berlin");
    assert_eq!(
        state.selected_city.as_ref().map(|c| c.name.as_str()),
        Some("Berlin")
    );
}
