//! Stable per-installation client identity.
//!
//! Every request to the weather gateway carries an opaque client token for
//! server-side attribution and quota accounting. The token is generated on
//! first use and persisted; a given installation never issues two
//! different identities unless persistence is cleared.

use rand::Rng;
use tracing::{debug, warn};

use skycast_store::Storage;

/// Storage key for the persisted client token.
pub const CLIENT_ID_KEY: &str = "skycast.client-id";

const TOKEN_PREFIX: &str = "web-";
const TOKEN_SUFFIX_LEN: usize = 9;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Return the installation's client token, creating it on first call.
///
/// If the persistence layer cannot be read or written, a fresh in-memory
/// token is used for this session only. That loses attribution continuity
/// but is never a fatal error.
pub fn get_or_create(storage: &dyn Storage) -> String {
    match storage.get(CLIENT_ID_KEY) {
        Ok(Some(token)) => return token,
        Ok(None) => {}
        Err(e) => {
            warn!("Failed to read client identity, using a session-only token: {e}");
            return generate_token();
        }
    }

    let token = generate_token();
    debug!("Generated new client identity");

    if let Err(e) = storage.put(CLIENT_ID_KEY, &token) {
        warn!("Failed to persist client identity, token is session-only: {e}");
    }

    token
}

/// Generate a token of the form `web-[a-z0-9]{9}`.
///
/// Collision avoidance across installations only requires a reasonable
/// spread (36^9 values), not cryptographic strength.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..TOKEN_SUFFIX_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect();

    format!("{TOKEN_PREFIX}{suffix}")
}
