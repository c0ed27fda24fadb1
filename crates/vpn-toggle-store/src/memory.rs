//! In-memory storage implementation.
//!
//! Values are kept in their encoded form so that the memory backend goes
//! through the same codec as [`RocksStore`](crate::RocksStore).

use std::collections::HashMap;

use parking_lot::RwLock;
use vpn_toggle_core::StatusSnapshot;

use crate::codec;
use crate::error::Result;
use crate::keys;
use crate::SnapshotStore;

/// A process-local store, for tests and runs without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<&'static [u8], Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded.
    pub fn with_snapshot(snapshot: &StatusSnapshot) -> Result<Self> {
        let store = Self::new();
        store.put_snapshot(snapshot)?;
        Ok(store)
    }

    /// Overwrite the raw snapshot bytes, bypassing the codec.
    pub fn put_raw_snapshot(&self, data: impl Into<Vec<u8>>) {
        self.values.write().insert(keys::snapshot_key(), data.into());
    }
}

impl SnapshotStore for MemoryStore {
    fn get_snapshot(&self) -> Result<Option<StatusSnapshot>> {
        self.values
            .read()
            .get(keys::snapshot_key())
            .map(|data| codec::decode_snapshot(data))
            .transpose()
    }

    fn put_snapshot(&self, snapshot: &StatusSnapshot) -> Result<()> {
        let value = codec::encode_snapshot(snapshot)?;
        self.values.write().insert(keys::snapshot_key(), value);
        Ok(())
    }

    fn get_api_key(&self) -> Result<Option<String>> {
        self.values
            .read()
            .get(keys::api_key_key())
            .cloned()
            .map(codec::decode_api_key)
            .transpose()
    }

    fn put_api_key(&self, api_key: &str) -> Result<()> {
        self.values
            .write()
            .insert(keys::api_key_key(), api_key.as_bytes().to_vec());
        Ok(())
    }
}
