//! Partition engine: three partition flavors over one storage, index,
//! and cache substrate, plus the registry that owns their directories.
//!
//! - `partition`: plain, unitemporal (versioned), and bitemporal
//!   partitions sharing the [`partition`] substrate
//! - `join`: cross-partition join resolution (late-bound by name)
//! - `registry`: [`Database`], partition construction, and backup

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backup;
mod join;
pub mod partition;
pub mod registry;

pub use partition::{BitemporalPartition, Partition, VersionedPartition};
pub use registry::{Database, DatabaseConfig};
pub use varve_storage::CacheStats;
