//! Varve: an embedded, file-backed key-value store with unitemporal
//! versioning, bitemporal milestoning, secondary indices, and joins.
//!
//! A [`Database`] binds a base directory and hands out partition
//! handles, one directory per partition, one JSON file per key:
//!
//! ```no_run
//! use serde_json::json;
//! use varve::Database;
//!
//! let db = Database::open("./data");
//!
//! let albums = db.get_partition("albums", &["artist"], None).unwrap();
//! albums.set("continuum", json!({"artist": "John Mayer", "year": 2006}));
//! assert_eq!(albums.get("John Mayer"), albums.get("continuum"));
//!
//! let prices = db.get_bitemporal_partition("prices", &[], None).unwrap();
//! prices.set("btc", json!(42000), Some(1_700_000_000_000), None, None).unwrap();
//! ```
//!
//! Three partition flavors share one storage, index, and cache
//! substrate:
//!
//! - [`Partition`] — direct key → value
//! - [`VersionedPartition`] — append-only version timeline per key
//! - [`BitemporalPartition`] — valid-time milestoned slices per key

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;

pub use types::*;
