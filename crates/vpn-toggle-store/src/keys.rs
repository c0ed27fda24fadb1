//! Well-known storage keys.
//!
//! Both values live under fixed keys; there is never more than one snapshot
//! or one API key in a store.

/// Key of the last known status snapshot.
pub const LAST_KNOWN_STATUS: &str = "lastKnownStatus";

/// Key of the control API key.
pub const API_KEY: &str = "vpnApiKey";

/// Encode the snapshot key.
#[must_use]
pub fn snapshot_key() -> &'static [u8] {
    LAST_KNOWN_STATUS.as_bytes()
}

/// Encode the API key key.
#[must_use]
pub fn api_key_key() -> &'static [u8] {
    API_KEY.as_bytes()
}
