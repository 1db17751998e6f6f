//! Bitemporal partition: valid-time milestoned slices per key.
//!
//! Every write carries a valid-time interval `[validFrom, validTo)`.
//! Existing live slices that conflict with the new interval are
//! superseded (their `deletedAt` set to the transaction time) and, where
//! a remainder survives, re-milestoned as narrowed live copies. The live
//! timeline therefore stays pairwise non-overlapping while every
//! superseded slice is retained for audit.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use varve_core::path::validate_key;
use varve_core::{
    now_millis, BitemporalRecord, Metadata, Slice, Timestamp, VarveError, VarveResult,
    INFINITY_TIME,
};
use varve_storage::{codec, CacheStats};

use super::PartitionCore;

/// Valid-time milestoned key → value partition.
pub struct BitemporalPartition {
    pub(crate) core: PartitionCore,
}

impl BitemporalPartition {
    /// Partition name under the registry base directory.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Write `value` valid over `[valid_from, valid_to)`.
    ///
    /// `valid_from` defaults to now, `valid_to` to open-ended. Returns
    /// `Ok(true)` on success and `Ok(false)` on a demoted IO failure;
    /// an empty interval (`valid_to <= valid_from`) is rejected with
    /// [`VarveError::InvalidInterval`].
    pub fn set(
        &self,
        key: &str,
        value: Value,
        valid_from: Option<Timestamp>,
        valid_to: Option<Timestamp>,
        metadata: Option<Metadata>,
    ) -> VarveResult<bool> {
        let nvf = valid_from.unwrap_or_else(now_millis);
        let nvt = valid_to.unwrap_or(INFINITY_TIME);
        if nvt != INFINITY_TIME && nvt <= nvf {
            return Err(VarveError::invalid_interval(nvf, nvt));
        }
        if validate_key(key).is_err() {
            return Ok(false);
        }
        let Some(mut state) = self.core.lock_open() else {
            return Ok(false);
        };
        let path = self.core.layout.key_file(key);
        let mut record: BitemporalRecord = codec::read(&path).unwrap_or_default();
        let t = now_millis();
        let old = record.slice_covering(t).map(|slice| slice.data.clone());
        if record.is_empty() {
            record.data.push(Slice {
                data: value.clone(),
                created_at: t,
                deleted_at: INFINITY_TIME,
                valid_from: nvf,
                valid_to: nvt,
                metadata,
            });
        } else {
            milestone(&mut record, value.clone(), nvf, nvt, metadata, t);
        }
        if let Err(err) = codec::write_atomic(&path, &record) {
            warn!(partition = %self.name(), key, %err, "failed to write record file");
            return Ok(false);
        }
        if !self.core.refresh_index(&mut state, old.as_ref(), Some(&value), key) {
            return Ok(false);
        }
        match record.slice_covering(now_millis()) {
            Some(slice) => state.cache.set(key, slice.data.clone()),
            None => {
                state.cache.delete(key);
            }
        }
        Ok(true)
    }

    /// Read the value valid as of now (primary or alternative key).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.core.get_latest(key)
    }

    /// Read the value valid as of `as_of`. Bypasses the cache.
    pub fn get_as_of(&self, key: &str, as_of: Timestamp) -> Option<Value> {
        self.read_record(key)?
            .slice_covering(as_of)
            .map(|slice| slice.data.clone())
    }

    /// Read the full live slice covering `as_of` (now when `None`).
    /// Bypasses the cache.
    pub fn get_slice(&self, key: &str, as_of: Option<Timestamp>) -> Option<Slice> {
        let record = self.read_record(key)?;
        let at = as_of.unwrap_or_else(now_millis);
        record.slice_covering(at).cloned()
    }

    /// Every slice for `key`, live and superseded, in insertion order;
    /// `None` when the key does not exist.
    pub fn get_all_versions(&self, key: &str) -> Option<Vec<Slice>> {
        self.read_record(key).map(|record| record.data)
    }

    /// True when `key` resolves to a cached entry or an existing file.
    pub fn exists(&self, key: &str) -> bool {
        self.core.exists(key)
    }

    /// Remove `key`'s whole slice history. Returns `true` iff a file
    /// was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.core.delete(key)
    }

    /// Every primary key with a record file, in directory order.
    pub fn keys(&self) -> Vec<String> {
        self.core.keys()
    }

    /// Aggregate the as-of-now value of every key into a mapping.
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

    /// Fetch the as-of-now value of `key` and materialize the joined
    /// view.
    pub fn get_with_joins(&self, key: &str) -> VarveResult<Option<Value>> {
        self.core.get_with_joins(key)
    }

    /// Cache counter snapshot.
    pub fn cache_stats(&self) -> CacheStats {
        self.core.cache_stats()
    }

    fn read_record(&self, key: &str) -> Option<BitemporalRecord> {
        if validate_key(key).is_err() {
            return None;
        }
        let state = self.core.lock_open()?;
        let primary = state.index.resolve(key).to_string();
        codec::read(&self.core.layout.key_file(&primary))
    }
}

/// Re-milestone the live timeline for a write of `value` over
/// `[nvf, nvt)` at transaction time `t`.
///
/// Walks the live slices once:
/// - a slice enclosing `nvf` is the predecessor: it is superseded and a
///   narrowed copy `[validFrom, nvf)` survives (skipped when empty);
/// - a slice starting inside the new interval is superseded; when the
///   new interval ends inside it, a narrowed copy `[nvt, validTo)` is
///   appended after the new slice.
fn milestone(
    record: &mut BitemporalRecord,
    value: Value,
    nvf: Timestamp,
    nvt: Timestamp,
    metadata: Option<Metadata>,
    t: Timestamp,
) {
    let mut before: Option<Slice> = None;
    let mut after: Option<Slice> = None;
    for slice in record.data.iter_mut().filter(|s| s.is_live()) {
        let encloses =
            slice.valid_from <= nvf && (slice.valid_to == INFINITY_TIME || nvf < slice.valid_to);
        if encloses {
            before = Some(slice.clone());
            slice.deleted_at = t;
        }
        if nvf <= slice.valid_from {
            slice.deleted_at = t;
            if nvt != INFINITY_TIME
                && slice.valid_from < nvt
                && (slice.valid_to == INFINITY_TIME || nvt < slice.valid_to)
            {
                after = Some(slice.clone());
            }
        }
    }
    if let Some(before) = before {
        if before.valid_from < nvf {
            record.data.push(Slice {
                valid_to: nvf,
                deleted_at: INFINITY_TIME,
                ..before
            });
        }
    }
    record.data.push(Slice {
        data: value,
        created_at: t,
        deleted_at: INFINITY_TIME,
        valid_from: nvf,
        valid_to: nvt,
        metadata,
    });
    if let Some(after) = after {
        record.data.push(Slice {
            valid_from: nvt,
            deleted_at: INFINITY_TIME,
            ..after
        });
    }
}
