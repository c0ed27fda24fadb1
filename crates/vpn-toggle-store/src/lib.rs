//! Storage layer for vpn-toggle.
//!
//! The store keeps exactly two values under fixed, well-known keys:
//!
//! - `lastKnownStatus`: the JSON-encoded [`StatusSnapshot`] used to show the
//!   last known state before the first network round trip completes
//! - `vpnApiKey`: the API key entered in settings
//!
//! Two backends are provided: [`RocksStore`] for durable storage and
//! [`MemoryStore`] for tests and ephemeral runs.
//!
//! # Example
//!
//! ```no_run
//! use vpn_toggle_core::{ResourceState, StatusSnapshot};
//! use vpn_toggle_store::{RocksStore, SnapshotStore};
//!
//! let store = RocksStore::open("/tmp/vpn-toggle-db").unwrap();
//!
//! store.save(&StatusSnapshot::now(ResourceState::Stopped, None, "VPN is stopped"));
//! let snapshot = store.load();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codec;
pub mod error;
pub mod keys;
pub mod memory;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;

use vpn_toggle_core::StatusSnapshot;

/// The storage trait for the status snapshot and the credential value.
///
/// Backends implement the fallible `get_*`/`put_*` methods. Callers on the
/// status path use [`load`](SnapshotStore::load) and
/// [`save`](SnapshotStore::save), which never fail: a snapshot is only a cache
/// of remote state, so storage problems are logged and otherwise ignored.
pub trait SnapshotStore: Send + Sync {
    /// Read the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails or the stored value cannot
    /// be decoded.
    fn get_snapshot(&self) -> Result<Option<StatusSnapshot>>;

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the database write fails.
    fn put_snapshot(&self, snapshot: &StatusSnapshot) -> Result<()>;

    /// Read the stored API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails or the value is not UTF-8.
    fn get_api_key(&self) -> Result<Option<String>>;

    /// Overwrite the stored API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    fn put_api_key(&self, api_key: &str) -> Result<()>;

    /// Load the last saved snapshot, or `None` if absent or undecodable.
    fn load(&self) -> Option<StatusSnapshot> {
        match self.get_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable status snapshot");
                None
            }
        }
    }

    /// Load the stored API key, or `None` if absent or unreadable.
    fn load_api_key(&self) -> Option<String> {
        match self.get_api_key() {
            Ok(key) => key.filter(|key| !key.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable API key");
                None
            }
        }
    }

    /// Save a snapshot, logging and dropping any failure.
    fn save(&self, snapshot: &StatusSnapshot) {
        if let Err(e) = self.put_snapshot(snapshot) {
            tracing::warn!(error = %e, state = ?snapshot.state, "Failed to persist status snapshot");
        }
    }
}
