//! Public types for the varve unified API.
//!
//! This module re-exports types from the internal crates with a clean
//! public interface.

// ============================================================================
// Registry and partitions
// ============================================================================

pub use varve_engine::{BitemporalPartition, Database, DatabaseConfig, Partition, VersionedPartition};

// ============================================================================
// Record shapes and temporal types
// ============================================================================

pub use varve_core::{BitemporalRecord, Metadata, Slice, VersionSlot, VersionedRecord};
pub use varve_core::{now_millis, Timestamp, INFINITY_TIME};

// ============================================================================
// Errors and field paths
// ============================================================================

pub use varve_core::{FieldPath, VarveError, VarveResult};

// Cache introspection.
pub use varve_engine::CacheStats;
