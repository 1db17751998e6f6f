//! JSON file codec.
//!
//! Records are compact JSON text. Reads treat a missing, unreadable, or
//! unparseable file as an absent record — a corrupt key never becomes a
//! partition-level failure. Writes go through a temp file plus rename so
//! a failed write leaves the previous record intact.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Read and parse a JSON file. Absent, unreadable, or malformed files
/// all report `None`; only the latter two are logged.
pub fn read<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read record file");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to parse record file");
            None
        }
    }
}

/// Serialize `value` and replace `path` atomically (write to `.tmp`,
/// then rename over the target).
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let bytes = serde_json::to_vec(value).map_err(io::Error::other)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)
}

/// Remove a record file. Returns `true` iff a file was removed.
pub fn remove(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.json");
        let value = json!({"song": "Gravity", "year": 2006});

        write_atomic(&path, &value).unwrap();
        assert_eq!(read::<Value>(&path), Some(value));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read::<Value>(&dir.path().join("nope.json")), None);
    }

    #[test]
    fn malformed_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(read::<Value>(&path), None);
    }

    #[test]
    fn write_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.json");
        write_atomic(&path, &json!(1)).unwrap();
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn rewrite_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.json");
        write_atomic(&path, &json!("old")).unwrap();
        write_atomic(&path, &json!("new")).unwrap();
        assert_eq!(read::<Value>(&path), Some(json!("new")));
    }

    #[test]
    fn remove_reports_whether_a_file_existed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.json");
        write_atomic(&path, &json!(1)).unwrap();
        assert!(remove(&path).unwrap());
        assert!(!remove(&path).unwrap());
    }
}
