//! Unitemporal partition: an append-only version timeline per key.
//!
//! Every write closes the live version at the transaction time and
//! appends the next one, so history is immutable and fully auditable.
//! Only the latest value participates in indexing and caching.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use varve_core::path::validate_key;
use varve_core::{now_millis, Metadata, VarveResult, VersionSlot, VersionedRecord};
use varve_storage::{codec, CacheStats};

use super::PartitionCore;

/// Versioned key → value partition.
pub struct VersionedPartition {
    pub(crate) core: PartitionCore,
}

impl VersionedPartition {
    /// Partition name under the registry base directory.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Append a new version of `key`. Returns `true` on success.
    pub fn set(&self, key: &str, value: Value) -> bool {
        self.set_with_metadata(key, value, None)
    }

    /// Append a new version of `key` carrying writer metadata.
    ///
    /// The previous version's `deletedAt` and the new version's
    /// `createdAt` are stamped with the same transaction time.
    pub fn set_with_metadata(&self, key: &str, value: Value, metadata: Option<Metadata>) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        let Some(mut state) = self.core.lock_open() else {
            return false;
        };
        let path = self.core.layout.key_file(key);
        let mut record: VersionedRecord = codec::read(&path).unwrap_or_default();
        let old = record.latest_value().cloned();
        record.push_version(value.clone(), metadata, now_millis());
        if let Err(err) = codec::write_atomic(&path, &record) {
            warn!(partition = %self.name(), key, %err, "failed to write record file");
            return false;
        }
        if !self.core.refresh_index(&mut state, old.as_ref(), Some(&value), key) {
            return false;
        }
        state.cache.set(key, value);
        true
    }

    /// Read the latest value for `key` (primary or alternative).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.core.get_latest(key)
    }

    /// Read the value written at `version`. Bypasses the cache.
    pub fn get_version(&self, key: &str, version: u64) -> Option<Value> {
        self.read_record(key)?
            .data
            .get(&version)
            .map(|slot| slot.data.clone())
    }

    /// Read the full slot (value plus audit fields) at `version`, or
    /// the latest slot when `version` is `None`. Bypasses the cache.
    pub fn get_slot(&self, key: &str, version: Option<u64>) -> Option<VersionSlot> {
        let record = self.read_record(key)?;
        let version = version.unwrap_or(record.latest_version);
        record.data.get(&version).cloned()
    }

    /// Every slot for `key` in increasing version order, or `None` when
    /// the key does not exist.
    pub fn get_all_versions(&self, key: &str) -> Option<Vec<VersionSlot>> {
        let record = self.read_record(key)?;
        Some(record.data.into_values().collect())
    }

    /// True when `key` resolves to a cached entry or an existing file.
    pub fn exists(&self, key: &str) -> bool {
        self.core.exists(key)
    }

    /// Remove `key`'s whole timeline. Returns `true` iff a file was
    /// removed.
    pub fn delete(&self, key: &str) -> bool {
        self.core.delete(key)
    }

    /// Every primary key with a record file, in directory order.
    pub fn keys(&self) -> Vec<String> {
        self.core.keys()
    }

    /// Aggregate the latest value of every key into a mapping.
    pub fn data(&self) -> BTreeMap<String, Value> {
        self.core.data()
    }

    /// Register a join to partition `db`, merged under `join_name`.
    pub fn create_join(
        &self,
        db: &str,
        join_name: &str,
        left_field: &str,
        right_field: Option<&str>,
    ) -> VarveResult<()> {
        self.core.create_join(db, join_name, left_field, right_field)
    }

    /// Fetch the latest value of `key` and materialize the joined view.
    pub fn get_with_joins(&self, key: &str) -> VarveResult<Option<Value>> {
        self.core.get_with_joins(key)
    }

    /// Cache counter snapshot.
    pub fn cache_stats(&self) -> CacheStats {
        self.core.cache_stats()
    }

    fn read_record(&self, key: &str) -> Option<VersionedRecord> {
        if validate_key(key).is_err() {
            return None;
        }
        let state = self.core.lock_open()?;
        let primary = state.index.resolve(key).to_string();
        codec::read(&self.core.layout.key_file(&primary))
    }
}
