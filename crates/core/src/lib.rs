//! Core types for the varve partition engine.
//!
//! This crate defines the vocabulary shared by every layer above it:
//! - `error`: the error taxonomy (`VarveError`, `VarveResult`)
//! - `time`: epoch-millisecond timestamps and the open-ended sentinel
//! - `path`: dotted field paths and key/name validation
//! - `record`: on-disk record shapes for the three partition flavors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod path;
pub mod record;
pub mod time;

pub use error::{VarveError, VarveResult};
pub use path::FieldPath;
pub use record::{BitemporalRecord, Metadata, Slice, VersionSlot, VersionedRecord};
pub use time::{now_millis, Timestamp, INFINITY_TIME};
