//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `SnapshotStore` trait.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};
use vpn_toggle_core::StatusSnapshot;

use crate::codec;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::SnapshotStore;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf::SETTINGS)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.cf(cf::SETTINGS)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl SnapshotStore for RocksStore {
    fn get_snapshot(&self) -> Result<Option<StatusSnapshot>> {
        self.get_raw(keys::snapshot_key())?
            .map(|data| codec::decode_snapshot(&data))
            .transpose()
    }

    fn put_snapshot(&self, snapshot: &StatusSnapshot) -> Result<()> {
        let value = codec::encode_snapshot(snapshot)?;
        self.put_raw(keys::snapshot_key(), &value)
    }

    fn get_api_key(&self) -> Result<Option<String>> {
        self.get_raw(keys::api_key_key())?
            .map(codec::decode_api_key)
            .transpose()
    }

    fn put_api_key(&self, api_key: &str) -> Result<()> {
        self.put_raw(keys::api_key_key(), api_key.as_bytes())
    }
}
