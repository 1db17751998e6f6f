//! Dotted field paths and key validation.
//!
//! A field path like `"artist.name"` is resolved left-to-right through
//! nested JSON objects. Missing intermediates yield absent. There is no
//! array or wildcard syntax.
//!
//! Key validation mirrors the filename constraints of the storage
//! layout: keys become `<key>.json` files, so they must be usable as a
//! single path component and must not collide with reserved files.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{VarveError, VarveResult};

/// Reserved prefix for engine-owned files inside a partition directory.
pub const RESERVED_PREFIX: &str = "__";

// =============================================================================
// Validation
// =============================================================================

/// Validate a primary key (or alternative-key lookup string).
pub fn validate_key(key: &str) -> VarveResult<()> {
    if key.is_empty() {
        return Err(VarveError::invalid_argument("key must not be empty"));
    }
    if key.contains('/') || key.contains('\\') {
        return Err(VarveError::invalid_argument(
            "key must not contain path separators",
        ));
    }
    if key == "." || key == ".." {
        return Err(VarveError::invalid_argument("key must not be '.' or '..'"));
    }
    if key.starts_with(RESERVED_PREFIX) {
        return Err(VarveError::invalid_argument(
            "key must not start with '__' (reserved)",
        ));
    }
    Ok(())
}

/// Validate a partition name. Partition names become directory names
/// under the registry base directory, so the same constraints apply.
pub fn validate_partition_name(name: &str) -> VarveResult<()> {
    if name.is_empty() {
        return Err(VarveError::invalid_argument(
            "partition name must not be empty",
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(VarveError::invalid_argument(
            "partition name must not contain path separators",
        ));
    }
    if name == "." || name == ".." {
        return Err(VarveError::invalid_argument(
            "partition name must not be '.' or '..'",
        ));
    }
    if name.starts_with(RESERVED_PREFIX) {
        return Err(VarveError::invalid_argument(
            "partition name must not start with '__' (reserved)",
        ));
    }
    Ok(())
}

// =============================================================================
// Field paths
// =============================================================================

/// A parsed dotted field path (`"a.b.c"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// The original dotted form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve the path against a JSON value, descending through nested
    /// objects. Returns `None` when any intermediate is absent or not an
    /// object.
    pub fn extract<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Resolve the path and coerce the leaf to its index string form.
    /// See [`coerce_index_string`] for the coercion rules.
    pub fn extract_string(&self, value: &Value) -> Option<String> {
        self.extract(value).and_then(coerce_index_string)
    }
}

impl FromStr for FieldPath {
    type Err = VarveError;

    fn from_str(s: &str) -> VarveResult<Self> {
        if s.is_empty() {
            return Err(VarveError::invalid_argument("field path must not be empty"));
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(VarveError::invalid_argument(format!(
                "field path '{s}' has an empty segment"
            )));
        }
        Ok(FieldPath {
            raw: s.to_string(),
            segments,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Coerce an extracted leaf into the string used as an alternative key.
///
/// Strings are used verbatim; numbers and booleans take their natural
/// string form. Null, arrays, and objects are not indexable and yield
/// `None`.
pub fn coerce_index_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
