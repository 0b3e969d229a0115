//! Durable application state.
//!
//! [`StateStore`] is the sole reader and writer of the three state slots:
//! the tracked-city list, the selected city, and the settings. Loading is
//! best-effort per slot so one corrupt value never takes down the rest,
//! and saving is fire-and-forget: a persistence failure is logged and the
//! in-memory state stays authoritative.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use skycast_types::{PersistedState, Settings, TrackedCity};

use crate::storage::Storage;

/// Storage key for the tracked-city list (JSON array).
pub const CITIES_KEY: &str = "skycast.cities";
/// Storage key for the selected city (JSON object, absent when none).
pub const SELECTED_CITY_KEY: &str = "skycast.selected-city";
/// Storage key for the settings blob (JSON object).
pub const SETTINGS_KEY: &str = "skycast.settings";

/// Loads and saves the durable application state.
pub struct StateStore {
    storage: Arc<dyn Storage>,
}

impl StateStore {
    /// Create a state store over the given persistence layer.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Restore the persisted state, falling back to defaults per slot.
    ///
    /// Called once at startup. A missing key is a valid first-run state;
    /// a malformed value for one key must not prevent the others from
    /// loading, so every failure degrades to that slot's default.
    pub fn load(&self) -> PersistedState {
        let cities: Vec<TrackedCity> = self.load_slot(CITIES_KEY).unwrap_or_default();
        let selected_city: Option<TrackedCity> = self.load_slot(SELECTED_CITY_KEY);
        let settings = self.load_settings();

        debug!(
            cities = cities.len(),
            selected = selected_city.is_some(),
            "Restored application state"
        );

        PersistedState {
            cities,
            selected_city,
            settings,
        }
    }

    /// Persist the tracked-city list.
    pub fn save_cities(&self, cities: &[TrackedCity]) {
        self.save_slot(CITIES_KEY, &cities);
    }

    /// Persist the selected city, or clear the slot when none is selected.
    pub fn save_selected(&self, selected: Option<&TrackedCity>) {
        match selected {
            Some(city) => self.save_slot(SELECTED_CITY_KEY, city),
            None => {
                if let Err(e) = self.storage.remove(SELECTED_CITY_KEY) {
                    warn!("Failed to clear slot '{}': {}", SELECTED_CITY_KEY, e);
                }
            }
        }
    }

    /// Persist the settings.
    pub fn save_settings(&self, settings: &Settings) {
        self.save_slot(SETTINGS_KEY, settings);
    }

    /// Persist all three slots.
    pub fn save(&self, state: &PersistedState) {
        self.save_cities(&state.cities);
        self.save_selected(state.selected_city.as_ref());
        self.save_settings(&state.settings);
    }

    /// Settings load with per-field validation: a field whose value is not
    /// a recognized enum member is discarded in favor of the default while
    /// its valid siblings still apply.
    fn load_settings(&self) -> Settings {
        let mut settings = Settings::default();

        let Some(blob) = self.load_slot::<Value>(SETTINGS_KEY) else {
            return settings;
        };

        if let Some(provider) = settings_field(&blob, "provider") {
            settings.provider = provider;
        }
        if let Some(unit) = settings_field(&blob, "temperature_unit") {
            settings.temperature_unit = unit;
        }
        if let Some(interval) = settings_field(&blob, "poll_interval") {
            settings.poll_interval = interval;
        }

        settings
    }

    fn load_slot<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read slot '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding malformed value in slot '{}': {}", key, e);
                None
            }
        }
    }

    fn save_slot<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize slot '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.storage.put(key, &raw) {
            warn!("Failed to write slot '{}': {}", key, e);
        }
    }
}

fn settings_field<T: serde::de::DeserializeOwned>(blob: &Value, name: &str) -> Option<T> {
    let raw = blob.get(name)?;
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding invalid settings field '{}': {}", name, e);
            None
        }
    }
}
