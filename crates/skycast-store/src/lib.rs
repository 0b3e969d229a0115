//! Local persistence for SkyCast application state.
//!
//! This crate provides the key-value persistence seam used by the rest of
//! SkyCast, a SQLite-backed implementation of it, and the [`StateStore`]
//! that owns the durable application state (tracked cities, selection,
//! settings).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use skycast_store::{SqliteStorage, StateStore};
//!
//! let storage = Arc::new(SqliteStorage::open_default()?);
//! let store = StateStore::new(storage);
//! let state = store.load();
//! println!("Tracking {} cities", state.cities.len());
//! # Ok::<(), skycast_store::Error>(())
//! ```

mod error;
mod schema;
mod sqlite;
mod state;
mod storage;

pub use error::{Error, Result};
pub use sqlite::SqliteStorage;
pub use state::{CITIES_KEY, SELECTED_CITY_KEY, SETTINGS_KEY, StateStore};
pub use storage::{MemoryStorage, Storage};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/skycast/state.db`
/// - macOS: `~/Library/Application Support/skycast/state.db`
/// - Windows: `C:\Users\<user>\AppData\Local\skycast\state.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("skycast")
        .join("state.db")
}
