//! Error taxonomy for the partition engine.
//!
//! Only two error kinds surface from partition operations: invalid
//! arguments (join misconfiguration) and invalid valid-time intervals.
//! IO and codec failures are demoted at the partition boundary — reads
//! report the key as absent, writes report `false`. The `Io` and `Codec`
//! variants exist for the internal plumbing and for registry-level
//! operations (backup), which do propagate them.

use thiserror::Error;

/// Result alias used throughout the varve crates.
pub type VarveResult<T> = Result<T, VarveError>;

/// Errors raised by the partition engine and registry.
#[derive(Debug, Error)]
pub enum VarveError {
    /// A caller-supplied argument was empty or malformed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable description of the offending argument.
        reason: String,
    },

    /// A bitemporal write carried an empty valid-time interval.
    #[error("invalid valid-time interval: [{valid_from}, {valid_to})")]
    InvalidInterval {
        /// Start of the rejected interval.
        valid_from: i64,
        /// End of the rejected interval.
        valid_to: i64,
    },

    /// A registry lookup named a partition that was never registered.
    #[error("partition not found: {name}")]
    PartitionNotFound {
        /// The unknown partition name.
        name: String,
    },

    /// Filesystem failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or parse failure.
    #[error("codec: {0}")]
    Codec(#[from] serde_json::Error),
}

impl VarveError {
    /// Build an [`VarveError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        VarveError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Build an [`VarveError::InvalidInterval`].
    pub fn invalid_interval(valid_from: i64, valid_to: i64) -> Self {
        VarveError::InvalidInterval {
            valid_from,
            valid_to,
        }
    }

    /// Build an [`VarveError::PartitionNotFound`].
    pub fn partition_not_found(name: impl Into<String>) -> Self {
        VarveError::PartitionNotFound { name: name.into() }
    }
}
