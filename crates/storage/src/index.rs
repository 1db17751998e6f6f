//! Persistent alternative-key → primary-key map.
//!
//! Alternative keys are strings extracted from records via declared
//! field paths. The map is persisted to `__index__.json` as a whole-map
//! snapshot after every mutation; an absent or malformed snapshot loads
//! as an empty map. Every alternative key corresponds to the most
//! recent value of its bound primary key, maintained by removing the
//! prior value's entries before inserting the new value's.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use varve_core::FieldPath;

use crate::codec;

/// In-memory index map bound to its snapshot file.
#[derive(Debug)]
pub struct IndexMap {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl IndexMap {
    /// Bind an empty map to `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IndexMap {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the snapshot at `path`; absent or malformed starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut index = IndexMap::new(path);
        index.reload();
        index
    }

    /// Re-read the snapshot file, replacing the in-memory entries.
    pub fn reload(&mut self) {
        self.entries = codec::read(&self.path).unwrap_or_default();
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a lookup string: an alternative key maps to its primary
    /// key, anything else resolves to itself.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    /// True when `key` is a registered alternative key.
    pub fn is_alternative(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove the entries extracted from `value`. Returns whether the
    /// map changed.
    pub fn remove_for_value(&mut self, paths: &[FieldPath], value: &Value) -> bool {
        let mut changed = false;
        for path in paths {
            if let Some(alt) = path.extract_string(value) {
                changed |= self.entries.remove(&alt).is_some();
            }
        }
        changed
    }

    /// Insert entries extracted from `value`, binding them to
    /// `primary`. Returns whether the map changed.
    pub fn insert_for_value(&mut self, paths: &[FieldPath], value: &Value, primary: &str) -> bool {
        let mut changed = false;
        for path in paths {
            if let Some(alt) = path.extract_string(value) {
                changed |= self.entries.insert(alt, primary.to_string()).as_deref() != Some(primary);
            }
        }
        changed
    }

    /// Replace the entries of the prior value with those of the new
    /// value in one step. Returns whether the map changed.
    pub fn refresh(
        &mut self,
        paths: &[FieldPath],
        old_value: Option<&Value>,
        new_value: Option<&Value>,
        primary: &str,
    ) -> bool {
        let mut changed = false;
        if let Some(old) = old_value {
            changed |= self.remove_for_value(paths, old);
        }
        if let Some(new) = new_value {
            changed |= self.insert_for_value(paths, new, primary);
        }
        changed
    }

    /// Persist the whole map to its snapshot file.
    pub fn flush(&self) -> io::Result<()> {
        codec::write_atomic(&self.path, &self.entries)
    }

    /// Number of alternative keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no alternative keys are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn paths(raw: &[&str]) -> Vec<FieldPath> {
        raw.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn absent_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let index = IndexMap::load(dir.path().join("__index__.json"));
        assert!(index.is_empty());
    }

    #[test]
    fn malformed_snapshot_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("__index__.json");
        std::fs::write(&path, b"][").unwrap();
        let index = IndexMap::load(&path);
        assert!(index.is_empty());
    }

    #[test]
    fn flush_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("__index__.json");
        let paths = paths(&["artist"]);

        let mut index = IndexMap::load(&path);
        index.insert_for_value(&paths, &json!({"artist": "John Mayer"}), "gravity");
        index.flush().unwrap();

        let reloaded = IndexMap::load(&path);
        assert_eq!(reloaded.resolve("John Mayer"), "gravity");
        assert!(reloaded.is_alternative("John Mayer"));
    }

    #[test]
    fn resolve_falls_through_to_the_key_itself() {
        let dir = TempDir::new().unwrap();
        let index = IndexMap::load(dir.path().join("__index__.json"));
        assert_eq!(index.resolve("gravity"), "gravity");
    }

    #[test]
    fn refresh_moves_entries_to_the_new_value() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&["artist"]);
        let mut index = IndexMap::load(dir.path().join("__index__.json"));

        let old = json!({"artist": "John Mayer"});
        index.insert_for_value(&paths, &old, "gravity");

        let new = json!({"artist": "John Mayerz"});
        let changed = index.refresh(&paths, Some(&old), Some(&new), "gravity");
        assert!(changed);
        assert!(!index.is_alternative("John Mayer"));
        assert_eq!(index.resolve("John Mayerz"), "gravity");
    }

    #[test]
    fn nested_and_numeric_paths_extract() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&["album.artist", "year"]);
        let mut index = IndexMap::load(dir.path().join("__index__.json"));

        let doc = json!({"album": {"artist": "John Mayer"}, "year": 2006});
        index.insert_for_value(&paths, &doc, "gravity");

        assert_eq!(index.resolve("John Mayer"), "gravity");
        assert_eq!(index.resolve("2006"), "gravity");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn unextractable_fields_are_skipped() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&["artist"]);
        let mut index = IndexMap::load(dir.path().join("__index__.json"));

        let changed = index.insert_for_value(&paths, &json!({"song": "Gravity"}), "gravity");
        assert!(!changed);
        assert!(index.is_empty());
    }
}
