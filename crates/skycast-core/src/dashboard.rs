//! Dashboard session: tracked cities, selection, settings, and polling.
//!
//! [`Dashboard`] is the stateful controller a frontend drives. It owns the
//! in-memory application state, persists every mutation through
//! [`StateStore`], and keeps the [`WeatherPoller`] watching whichever city
//! is selected. Fresh results arrive on the event channel returned by
//! [`Dashboard::new`]; the frontend feeds current-weather snapshots back
//! via [`apply_current`](Dashboard::apply_current) so the per-city rollup
//! stays warm across restarts.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use skycast_store::{StateStore, Storage};
use skycast_types::{
    ForecastDay, GeoPoint, PersistedState, PollInterval, ProviderId, Settings, TemperatureUnit,
    TrackedCity, WeatherSnapshot,
};

use crate::client::WeatherClient;
use crate::error::{Error, Result};
use crate::poller::{PollEvent, PollOptions, WeatherPoller};
use crate::retry::{RetryConfig, with_retry};

/// Stateful dashboard controller.
pub struct Dashboard {
    client: Arc<dyn WeatherClient>,
    store: StateStore,
    state: PersistedState,
    poller: WeatherPoller,
}

impl Dashboard {
    /// Create a dashboard over the given gateway client and persistence
    /// layer, restoring any previously saved state.
    ///
    /// Returns the dashboard and the receiving end of its poll-event
    /// channel. Polling does not start until [`resume`](Self::resume) or a
    /// selection-changing operation is called.
    pub fn new(
        client: Arc<dyn WeatherClient>,
        storage: Arc<dyn Storage>,
        event_buffer: usize,
    ) -> (Self, mpsc::Receiver<PollEvent>) {
        let store = StateStore::new(storage);
        let state = store.load();

        let (tx, rx) = mpsc::channel(event_buffer);
        let poller = WeatherPoller::new(Arc::clone(&client), tx);

        let dashboard = Self {
            client,
            store,
            state,
            poller,
        };
        (dashboard, rx)
    }

    /// Start polling the restored selection, if any.
    pub fn resume(&mut self) {
        if let Some(city) = self.state.selected_city.clone() {
            info!(city = %city.name, "Resuming watch for restored selection");
            self.rewatch(city.location);
        }
    }

    /// Add a city and make it the selection.
    ///
    /// The location is checked against the tracked list first; a duplicate
    /// is rejected before any network traffic. On success the new city is
    /// seeded with a fresh snapshot, selected, persisted, and watched.
    pub async fn add_city(&mut self, name: &str, country: &str, location: GeoPoint) -> Result<()> {
        if self.state.cities.iter().any(|c| c.location == location) {
            return Err(Error::DuplicateCity {
                name: name.to_string(),
                location,
            });
        }

        let snapshot = self
            .client
            .current_weather(location, self.state.settings.provider)
            .await?;

        let city = TrackedCity {
            name: name.to_string(),
            country: country.to_string(),
            location,
            last_temperature: snapshot.temperature,
            last_condition: snapshot.condition,
            last_rain_chance: snapshot.rain_chance,
        };

        debug!(city = %city.name, %location, "Tracking new city");
        self.state.cities.push(city.clone());
        self.state.selected_city = Some(city);

        self.store.save_cities(&self.state.cities);
        self.store.save_selected(self.state.selected_city.as_ref());

        self.rewatch(location);
        Ok(())
    }

    /// Select a tracked city by name and start watching it.
    pub fn select_city(&mut self, name: &str) -> Result<()> {
        let city = self
            .state
            .cities
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| Error::CityNotFound(name.to_string()))?;

        let location = city.location;
        self.state.selected_city = Some(city);
        self.store.save_selected(self.state.selected_city.as_ref());

        self.rewatch(location);
        Ok(())
    }

    /// Clear the selection and stop polling.
    pub fn clear_selection(&mut self) {
        self.poller.stop();
        self.state.selected_city = None;
        self.store.save_selected(None);
    }

    /// Stop tracking a city.
    ///
    /// If the city was selected, the selection is cleared and polling
    /// stops; other tracked cities are unaffected.
    pub fn delete_city(&mut self, name: &str) -> Result<()> {
        let index = self
            .state
            .cities
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::CityNotFound(name.to_string()))?;

        let removed = self.state.cities.remove(index);
        self.store.save_cities(&self.state.cities);

        if self
            .state
            .selected_city
            .as_ref()
            .is_some_and(|c| c.location == removed.location)
        {
            self.clear_selection();
        }

        Ok(())
    }

    /// Change the weather provider.
    ///
    /// Takes effect on the next fetch; the active watch is restarted so
    /// the change is not delayed by up to a full interval.
    pub fn set_provider(&mut self, provider: ProviderId) {
        self.state.settings.provider = provider;
        self.store.save_settings(&self.state.settings);
        self.rewatch_selected();
    }

    /// Change the polling cadence, rescheduling from this moment.
    pub fn set_poll_interval(&mut self, interval: PollInterval) {
        self.state.settings.poll_interval = interval;
        self.store.save_settings(&self.state.settings);
        self.rewatch_selected();
    }

    /// Change the display unit. Pure presentation; no refetch.
    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.state.settings.temperature_unit = unit;
        self.store.save_settings(&self.state.settings);
    }

    /// One-off forecast fetch outside the polling cycle.
    ///
    /// Carries the same retry policy as polled forecast fetches, so a
    /// transient gateway outage is absorbed here too.
    pub async fn forecast(&self, location: GeoPoint, days: u32) -> Result<Vec<ForecastDay>> {
        let provider = self.state.settings.provider;
        with_retry(&RetryConfig::default(), "forecast", || {
            self.client.forecast(location, days, provider)
        })
        .await
    }

    /// Fold a fresh snapshot into the selected city's rollup and persist.
    pub fn apply_current(&mut self, snapshot: &WeatherSnapshot) {
        let Some(selected) = self.state.selected_city.as_mut() else {
            return;
        };

        selected.last_temperature = snapshot.temperature;
        selected.last_condition = snapshot.condition.clone();
        selected.last_rain_chance = snapshot.rain_chance;

        let location = selected.location;
        let rollup = selected.clone();
        if let Some(city) = self.state.cities.iter_mut().find(|c| c.location == location) {
            *city = rollup;
        }

        self.store.save_cities(&self.state.cities);
        self.store.save_selected(self.state.selected_city.as_ref());
    }

    /// The tracked cities, in insertion order.
    pub fn cities(&self) -> &[TrackedCity] {
        &self.state.cities
    }

    /// The selected city, if any.
    pub fn selected_city(&self) -> Option<&TrackedCity> {
        self.state.selected_city.as_ref()
    }

    /// The current settings.
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Whether the poller has an active watch.
    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    fn rewatch(&mut self, location: GeoPoint) {
        let options = PollOptions {
            provider: self.state.settings.provider,
            interval: self.state.settings.poll_interval.as_duration(),
            ..Default::default()
        };
        self.poller.watch(location, options);
    }

    fn rewatch_selected(&mut self) {
        if let Some(location) = self.state.selected_city.as_ref().map(|c| c.location) {
            self.rewatch(location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWeatherClient;
    use skycast_store::MemoryStorage;

    fn berlin() -> GeoPoint {
        GeoPoint::new(52.52, 13.405).unwrap()
    }

    fn kyiv() -> GeoPoint {
        GeoPoint::new(50.45, 30.52).unwrap()
    }

    fn setup() -> (Arc<MockWeatherClient>, Dashboard, mpsc::Receiver<PollEvent>) {
        setup_with(Arc::new(MemoryStorage::new()))
    }

    fn setup_with(
        storage: Arc<MemoryStorage>,
    ) -> (Arc<MockWeatherClient>, Dashboard, mpsc::Receiver<PollEvent>) {
        let mock = Arc::new(MockWeatherClient::new());
        let (dashboard, rx) =
            Dashboard::new(Arc::clone(&mock) as Arc<dyn WeatherClient>, storage, 32);
        (mock, dashboard, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_city_seeds_rollup_and_selects() {
        let (_, mut dashboard, _rx) = setup();

        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();

        let snapshot = MockWeatherClient::default_snapshot();
        assert_eq!(dashboard.cities().len(), 1);
        let city = &dashboard.cities()[0];
        assert_eq!(city.last_temperature, snapshot.temperature);
        assert_eq!(city.last_condition, snapshot.condition);
        assert_eq!(city.last_rain_chance, snapshot.rain_chance);
        assert_eq!(dashboard.selected_city().unwrap().name, "Berlin");
        assert!(dashboard.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_location_rejected_before_fetch() {
        let (mock, mut dashboard, _rx) = setup();

        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
        let calls_before = mock.current_calls();

        let result = dashboard.add_city("Berlin again", "DE", berlin()).await;
        assert!(matches!(result, Err(Error::DuplicateCity { .. })));
        assert_eq!(mock.current_calls(), calls_before);
        assert_eq!(dashboard.cities().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_add_leaves_state_untouched() {
        let (mock, mut dashboard, _rx) = setup();
        mock.always_fail(7);

        let result = dashboard.add_city("Berlin", "DE", berlin()).await;
        assert!(result.is_err());
        assert!(dashboard.cities().is_empty());
        assert!(dashboard.selected_city().is_none());
        assert!(!dashboard.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_unknown_city_fails() {
        let (_, mut dashboard, _rx) = setup();
        assert!(matches!(
            dashboard.select_city("Atlantis"),
            Err(Error::CityNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_selected_city_clears_selection() {
        let (_, mut dashboard, _rx) = setup();

        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
        dashboard.add_city("Kyiv", "UA", kyiv()).await.unwrap();
        dashboard.select_city("Berlin").unwrap();

        dashboard.delete_city("Berlin").unwrap();
        assert_eq!(dashboard.cities().len(), 1);
        assert!(dashboard.selected_city().is_none());
        assert!(!dashboard.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_unselected_city_keeps_watch() {
        let (_, mut dashboard, _rx) = setup();

        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
        dashboard.add_city("Kyiv", "UA", kyiv()).await.unwrap();

        dashboard.delete_city("Berlin").unwrap();
        assert_eq!(dashboard.selected_city().unwrap().name, "Kyiv");
        assert!(dashboard.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_off_forecast_retries_transient_failures() {
        let (mock, dashboard, _rx) = setup();
        mock.fail_next(1, crate::error::STATUS_UNAVAILABLE);

        let forecast = dashboard.forecast(berlin(), 5).await.unwrap();
        assert_eq!(forecast.len(), 5);
        // One transient failure plus the successful retry
        assert_eq!(mock.forecast_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_off_forecast_does_not_retry_permanent_failures() {
        let (mock, dashboard, _rx) = setup();
        mock.always_fail(3);

        let result = dashboard.forecast(berlin(), 5).await;
        assert!(matches!(result, Err(Error::Service { code: 3, .. })));
        assert_eq!(mock.forecast_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_current_updates_rollup() {
        let (_, mut dashboard, _rx) = setup();
        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();

        let mut snapshot = MockWeatherClient::default_snapshot();
        snapshot.temperature = -3.0;
        snapshot.condition = "Thunderstorm".to_string();
        snapshot.rain_chance = 90;
        dashboard.apply_current(&snapshot);

        let city = &dashboard.cities()[0];
        assert_eq!(city.last_temperature, -3.0);
        assert_eq!(city.last_condition, "Thunderstorm");
        assert_eq!(city.last_rain_chance, 90);
        assert_eq!(dashboard.selected_city().unwrap().last_rain_chance, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_temperature_unit_change_does_not_rewatch() {
        let (mock, mut dashboard, _rx) = setup();
        dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        let calls_before = mock.current_calls();

        dashboard.set_temperature_unit(TemperatureUnit::Fahrenheit);
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        assert_eq!(mock.current_calls(), calls_before);
        assert_eq!(
            dashboard.settings().temperature_unit,
            TemperatureUnit::Fahrenheit
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_survives_restart() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let (_, mut dashboard, _rx) = setup_with(storage.clone());
            dashboard.add_city("Berlin", "DE", berlin()).await.unwrap();
            dashboard.set_provider(ProviderId::WeatherApi);
        }

        let (_, mut dashboard, _rx) = setup_with(storage);
        assert_eq!(dashboard.cities().len(), 1);
        assert_eq!(dashboard.selected_city().unwrap().name, "Berlin");
        assert_eq!(dashboard.settings().provider, ProviderId::WeatherApi);
        assert!(!dashboard.is_polling());

        dashboard.resume();
        assert!(dashboard.is_polling());
    }
}
