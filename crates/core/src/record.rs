//! On-disk record shapes for the three partition flavors.
//!
//! A plain partition stores the value itself; the versioned and
//! bitemporal flavors wrap values in the envelope records defined here.
//! Field names are serialized in camelCase to match the file format:
//!
//! ```json
//! {"latestVersion": 2, "data": {"1": {...}, "2": {...}}}
//! {"data": [{"validFrom": 1, "validTo": 500, ...}]}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::time::{Timestamp, INFINITY_TIME};

/// Free-form string map attached to a write by the caller.
pub type Metadata = BTreeMap<String, String>;

// =============================================================================
// Unitemporal records
// =============================================================================

/// One version of a key in a unitemporal partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSlot {
    /// The value written at this version.
    pub data: Value,
    /// 1-based version number.
    pub version: u64,
    /// Transaction time this version was written (epoch ms).
    pub created_at: Timestamp,
    /// Transaction time this version was superseded, or
    /// [`INFINITY_TIME`] for the live version.
    pub deleted_at: Timestamp,
    /// Optional writer-supplied metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl VersionSlot {
    /// True when this slot is the live (latest) version.
    pub fn is_live(&self) -> bool {
        self.deleted_at == INFINITY_TIME
    }
}

/// Append-only version timeline for one key.
///
/// Versions are contiguous from 1; exactly one slot (the latest) has an
/// open-ended `deletedAt`, and each superseded slot's `deletedAt` equals
/// its successor's `createdAt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedRecord {
    /// Highest version number present in `data`.
    pub latest_version: u64,
    /// Slots keyed by version number.
    pub data: BTreeMap<u64, VersionSlot>,
}

impl VersionedRecord {
    /// The live slot, if any version exists.
    pub fn latest_slot(&self) -> Option<&VersionSlot> {
        self.data.get(&self.latest_version)
    }

    /// The live value, if any version exists.
    pub fn latest_value(&self) -> Option<&Value> {
        self.latest_slot().map(|slot| &slot.data)
    }

    /// Close the current version at `t` and append the next one.
    /// Returns the new version number.
    pub fn push_version(&mut self, value: Value, metadata: Option<Metadata>, t: Timestamp) -> u64 {
        if let Some(previous) = self.data.get_mut(&self.latest_version) {
            previous.deleted_at = t;
        }
        let next = self.latest_version + 1;
        self.data.insert(
            next,
            VersionSlot {
                data: value,
                version: next,
                created_at: t,
                deleted_at: INFINITY_TIME,
                metadata,
            },
        );
        self.latest_version = next;
        next
    }
}

// =============================================================================
// Bitemporal records
// =============================================================================

/// One milestoned slice of a key in a bitemporal partition: a value
/// together with its valid-time interval `[validFrom, validTo)` and
/// transaction-time audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    /// The value valid over this interval.
    pub data: Value,
    /// Transaction time this slice was written (epoch ms).
    pub created_at: Timestamp,
    /// Transaction time this slice was superseded, or
    /// [`INFINITY_TIME`] while it remains on the live timeline.
    pub deleted_at: Timestamp,
    /// Start of the valid-time interval (inclusive).
    pub valid_from: Timestamp,
    /// End of the valid-time interval (exclusive), or
    /// [`INFINITY_TIME`] for open-ended.
    pub valid_to: Timestamp,
    /// Optional writer-supplied metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Slice {
    /// True while the slice is on the live timeline.
    pub fn is_live(&self) -> bool {
        self.deleted_at == INFINITY_TIME
    }

    /// True when the valid-time interval contains `at`.
    pub fn covers(&self, at: Timestamp) -> bool {
        self.valid_from <= at && (self.valid_to == INFINITY_TIME || at < self.valid_to)
    }
}

/// All slices ever written for one key, in insertion order.
/// Superseded slices are retained for audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BitemporalRecord {
    /// Every slice, live and superseded.
    pub data: Vec<Slice>,
}

impl BitemporalRecord {
    /// True when no slice has ever been written.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterator over the live timeline.
    pub fn live_slices(&self) -> impl Iterator<Item = &Slice> {
        self.data.iter().filter(|s| s.is_live())
    }

    /// The unique live slice whose interval contains `at`, if any.
    pub fn slice_covering(&self, at: Timestamp) -> Option<&Slice> {
        self.live_slices().find(|s| s.covers(at))
    }
}
