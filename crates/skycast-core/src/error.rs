//! Error types for skycast-core.
//!
//! The taxonomy follows the weather feature's failure classes:
//!
//! | Error | Class | Handling |
//! |-------|-------|----------|
//! | [`Error::Service`] with code 13 | Transient transport | Retried for forecast fetches only |
//! | [`Error::Service`] other codes | Permanent transport | Surfaced immediately |
//! | [`Error::EmptyResponse`] | Malformed/empty success | Surfaced immediately |
//! | [`Error::NotReachable`] | Permanent transport | Surfaced immediately |
//! | [`Error::Persistence`] | Local | Recovered with defaults, never surfaced as a weather failure |
//!
//! On any fetch failure the previously published snapshot stays visible;
//! no error snapshot is synthesized.

use thiserror::Error;

use skycast_types::GeoPoint;

/// Protocol status code meaning the upstream service is unavailable.
///
/// This is the only code classified as transient and therefore eligible
/// for retry.
pub const STATUS_UNAVAILABLE: u32 = 13;

/// Protocol status code for errors the gateway did not classify.
pub const STATUS_UNKNOWN: u32 = 2;

/// Result type for skycast-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring or managing weather data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error
/// variants in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The weather gateway returned an error status.
    #[error("Weather service error (code {code}): {message}")]
    Service {
        /// Protocol status code.
        code: u32,
        /// Human-readable message from the gateway.
        message: String,
    },

    /// The gateway returned a well-formed but semantically empty response.
    #[error("Empty response from weather service")]
    EmptyResponse,

    /// The gateway could not be reached at all.
    #[error("Service not reachable at {url}: {source}")]
    NotReachable {
        /// The URL that was requested.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP client error outside of a request (e.g. building the client).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid gateway base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A city with these exact coordinates is already tracked.
    #[error("City '{name}' at {location} is already tracked")]
    DuplicateCity {
        /// Name of the already-tracked city at those coordinates.
        name: String,
        /// The rejected coordinates.
        location: GeoPoint,
    },

    /// No tracked city with the given name.
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// Persistence layer failure.
    #[error("Persistence error: {0}")]
    Persistence(#[from] skycast_store::Error),
}

impl Error {
    /// Whether this error is caused by temporary upstream unavailability
    /// and is therefore eligible for retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Service { code, .. } if *code == STATUS_UNAVAILABLE)
    }
}
