//! Partition directory layout.
//!
//! A partition is a single directory. Each primary key `K` owns one file
//! `<K>.json`; the reserved file `__index__.json` holds the index map
//! snapshot. Anything else in the directory is ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reserved file holding the serialized index map.
pub const INDEX_FILE: &str = "__index__.json";

const JSON_SUFFIX: &str = ".json";

/// Maps keys to on-disk file paths and lists a partition directory.
#[derive(Debug, Clone)]
pub struct PartitionLayout {
    dir: PathBuf,
}

impl PartitionLayout {
    /// Bind a layout to a partition directory (not created yet).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        PartitionLayout { dir: dir.into() }
    }

    /// The partition directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the partition directory if it does not exist.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// File path for a primary key.
    pub fn key_file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{JSON_SUFFIX}"))
    }

    /// File path of the index map snapshot.
    pub fn index_file(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// True when the key's file exists.
    pub fn key_exists(&self, key: &str) -> bool {
        self.key_file(key).is_file()
    }

    /// Every key with a record file, in directory order. The index file
    /// and entries that are not `*.json` files are skipped.
    pub fn list_keys(&self) -> io::Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name == INDEX_FILE {
                continue;
            }
            if let Some(key) = name.strip_suffix(JSON_SUFFIX) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}
