//! Partition substrate shared by the three flavors.
//!
//! A partition exclusively owns one directory plus its in-memory index
//! map and value cache. The flavor tag only changes how the current
//! value of a key is derived from its record file; everything else
//! (open-on-first-use, alternative-key resolution, cache discipline,
//! index refresh, listing, deletion, joins) is implemented once here.
//!
//! IO and codec failures never escape these operations: read paths
//! report the key as absent, write paths report `false`, each with a
//! `warn!` at the demotion point.

mod bitemporal;
mod plain;
mod versioned;

pub use bitemporal::BitemporalPartition;
pub use plain::Partition;
pub use versioned::VersionedPartition;

use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard, RwLock};
use serde_json::Value;
use tracing::warn;

use varve_core::path::validate_key;
use varve_core::{now_millis, BitemporalRecord, FieldPath, VarveError, VarveResult, VersionedRecord};
use varve_storage::{codec, CacheStats, IndexMap, PartitionLayout, ValueCache};

use crate::join::{self, Join};
use crate::registry::Database;

/// Which record shape a partition reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    Plain,
    Versioned,
    Bitemporal,
}

/// State guarded by the partition lock: open flag, index map, cache.
pub(crate) struct PartitionState {
    opened: bool,
    pub(crate) index: IndexMap,
    pub(crate) cache: ValueCache,
}

/// Shared substrate owned by every partition handle.
pub(crate) struct PartitionCore {
    name: String,
    flavor: Flavor,
    pub(crate) layout: PartitionLayout,
    pub(crate) index_paths: Vec<FieldPath>,
    registry: Database,
    state: Mutex<PartitionState>,
    joins: RwLock<Vec<Join>>,
}

impl PartitionCore {
    pub(crate) fn new(
        name: String,
        flavor: Flavor,
        layout: PartitionLayout,
        index_paths: Vec<FieldPath>,
        cache_capacity: usize,
        registry: Database,
    ) -> Self {
        let state = PartitionState {
            opened: false,
            index: IndexMap::new(layout.index_file()),
            cache: ValueCache::new(cache_capacity),
        };
        PartitionCore {
            name,
            flavor,
            layout,
            index_paths,
            registry,
            state: Mutex::new(state),
            joins: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Take the partition lock with the directory created and the index
    /// loaded. Idempotent; `None` when the directory cannot be created.
    pub(crate) fn lock_open(&self) -> Option<MutexGuard<'_, PartitionState>> {
        let mut state = self.state.lock();
        if !state.opened {
            if let Err(err) = self.layout.ensure_dir() {
                warn!(partition = %self.name, %err, "failed to create partition directory");
                return None;
            }
            state.index.reload();
            state.opened = true;
        }
        Some(state)
    }

    /// Derive the current (latest / as-of-now) value of a primary key
    /// from its record file, according to the flavor.
    pub(crate) fn read_current(&self, primary: &str) -> Option<Value> {
        let path = self.layout.key_file(primary);
        match self.flavor {
            Flavor::Plain => codec::read::<Value>(&path),
            Flavor::Versioned => codec::read::<VersionedRecord>(&path)?.latest_value().cloned(),
            Flavor::Bitemporal => codec::read::<BitemporalRecord>(&path)?
                .slice_covering(now_millis())
                .map(|slice| slice.data.clone()),
        }
    }

    /// Shared latest-value read: resolve through the index map, consult
    /// the cache, fall back to the record file, populate the cache.
    pub(crate) fn get_latest(&self, key: &str) -> Option<Value> {
        if validate_key(key).is_err() {
            return None;
        }
        let mut state = self.lock_open()?;
        let primary = state.index.resolve(key).to_string();
        if let Some(hit) = state.cache.get(&primary) {
            return Some(hit);
        }
        let value = self.read_current(&primary)?;
        state.cache.set(&primary, value.clone());
        Some(value)
    }

    pub(crate) fn exists(&self, key: &str) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        let Some(state) = self.lock_open() else {
            return false;
        };
        let primary = state.index.resolve(key).to_string();
        state.cache.has(&primary) || self.layout.key_exists(&primary)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let Some(_state) = self.lock_open() else {
            return Vec::new();
        };
        match self.layout.list_keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(partition = %self.name, %err, "failed to list partition directory");
                Vec::new()
            }
        }
    }

    pub(crate) fn data(&self) -> BTreeMap<String, Value> {
        let Some(mut state) = self.lock_open() else {
            return BTreeMap::new();
        };
        let keys = match self.layout.list_keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(partition = %self.name, %err, "failed to list partition directory");
                return BTreeMap::new();
            }
        };
        let mut out = BTreeMap::new();
        for key in keys {
            let value = match state.cache.get(&key) {
                Some(hit) => Some(hit),
                None => {
                    let value = self.read_current(&key);
                    if let Some(value) = &value {
                        state.cache.set(&key, value.clone());
                    }
                    value
                }
            };
            if let Some(value) = value {
                out.insert(key, value);
            }
        }
        out
    }

    /// Shared delete: resolve, capture the current value for index
    /// removal, remove the file, drop index entries, evict the cache.
    pub(crate) fn delete(&self, key: &str) -> bool {
        if validate_key(key).is_err() {
            return false;
        }
        let Some(mut state) = self.lock_open() else {
            return false;
        };
        let primary = state.index.resolve(key).to_string();
        let old = self.read_current(&primary);
        let removed = match codec::remove(&self.layout.key_file(&primary)) {
            Ok(removed) => removed,
            Err(err) => {
                warn!(partition = %self.name, key = %primary, %err, "failed to remove record file");
                return false;
            }
        };
        if removed {
            if let Some(old) = &old {
                if state.index.remove_for_value(&self.index_paths, old) {
                    self.flush_index(&state);
                }
            }
            state.cache.delete(&primary);
        }
        removed
    }

    /// Replace the index entries of `old` with those of `new` and
    /// persist the snapshot. Returns `false` when the snapshot write
    /// failed.
    pub(crate) fn refresh_index(
        &self,
        state: &mut PartitionState,
        old: Option<&Value>,
        new: Option<&Value>,
        primary: &str,
    ) -> bool {
        if state.index.refresh(&self.index_paths, old, new, primary) {
            return self.flush_index(state);
        }
        true
    }

    fn flush_index(&self, state: &PartitionState) -> bool {
        if let Err(err) = state.index.flush() {
            warn!(partition = %self.name, %err, "failed to flush index map");
            return false;
        }
        true
    }

    pub(crate) fn cache_stats(&self) -> CacheStats {
        self.state.lock().cache.stats()
    }

    // =========================================================================
    // Joins
    // =========================================================================

    pub(crate) fn create_join(
        &self,
        db: &str,
        join_name: &str,
        left_field: &str,
        right_field: Option<&str>,
    ) -> VarveResult<()> {
        let join = Join::new(db, join_name, left_field, right_field)?;
        self.joins.write().push(join);
        Ok(())
    }

    pub(crate) fn get_with_joins(&self, key: &str) -> VarveResult<Option<Value>> {
        let joins = self.joins.read().clone();
        if joins.is_empty() {
            return Err(VarveError::invalid_argument(format!(
                "partition '{}' has no joins declared",
                self.name
            )));
        }
        let Some(left) = self.get_latest(key) else {
            return Ok(None);
        };
        join::resolve(&self.registry, &joins, &left).map(Some)
    }
}
