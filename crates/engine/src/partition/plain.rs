//! Plain partition: direct key → value store with index, cache, and
//! join support.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use varve_core::path::validate_key;
use varve_core::VarveResult;
use varve_storage::{codec, CacheStats};

use super::PartitionCore;

/// Direct key → value partition.
///
/// `set` writes `<K>.json`, refreshes the index entries derived from
/// the value, and write-through caches it. `get` resolves alternative
/// keys to primary keys before consulting the cache or storage.
pub struct Partition {
    pub(crate) core: PartitionCore,
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition").finish()
    }
}

impl Partition {
    /// Partition name under the registry base directory.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Write `value` under `key`. Returns `true` on success; IO
    /// failures and invalid keys report `false`.
    pub fn set(&self, key: &str, value: Value) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        let Some(mut state) = self.core.lock_open() else {
            return false;
        };
        let old = self.core.read_current(key);
        if let Err(err) = codec::write_atomic(&self.core.layout.key_file(key), &value) {
            warn!(partition = %self.name(), key, %err, "failed to write record file");
            return false;
        }
        if !self.core.refresh_index(&mut state, old.as_ref(), Some(&value), key) {
            return false;
        }
        state.cache.set(key, value);
        true
    }

    /// Read the value for `key` (primary or alternative). Absent keys,
    /// unreadable files, and malformed records all report `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.core.get_latest(key)
    }

    /// True when `key` resolves to a cached entry or an existing file.
    pub fn exists(&self, key: &str) -> bool {
        self.core.exists(key)
    }

    /// Remove `key`'s record, its index entries, and its cache entry.
    /// Returns `true` iff a file was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.core.delete(key)
    }

    /// Every primary key with a record file, in directory order.
    pub fn keys(&self) -> Vec<String> {
        self.core.keys()
    }

    /// Aggregate `get` over every key into a mapping.
    pub fn data(&self) -> BTreeMap<String, Value> {
        self.core.data()
    }

    /// Register a join to partition `db`, merged under `join_name`.
    /// All arguments must be non-empty.
    pub fn create_join(
        &self,
        db: &str,
        join_name: &str,
        left_field: &str,
        right_field: Option<&str>,
    ) -> VarveResult<()> {
        self.core.create_join(db, join_name, left_field, right_field)
    }

    /// Fetch `key` and materialize the joined view. Fails when no joins
    /// are declared; absent left records report `None`.
    pub fn get_with_joins(&self, key: &str) -> VarveResult<Option<Value>> {
        self.core.get_with_joins(key)
    }

    /// Cache counter snapshot.
    pub fn cache_stats(&self) -> CacheStats {
        self.core.cache_stats()
    }
}
