//! Cross-partition join resolution.
//!
//! A join descriptor names a target partition; the target is fetched by
//! name through the parent registry on every invocation (late binding),
//! never held as an object reference. The right-field branch linearly
//! scans the target's full data set — O(N) in the target's key count.

use serde_json::{Map, Value};

use varve_core::path::coerce_index_string;
use varve_core::{VarveError, VarveResult};

use crate::registry::Database;

/// Non-persistent join descriptor registered on a partition.
#[derive(Debug, Clone)]
pub(crate) struct Join {
    /// Target partition name, resolved through the registry per call.
    pub db: String,
    /// Field name the joined record is merged under.
    pub join_name: String,
    /// Field of the left record supplying the lookup value.
    pub left_field: String,
    /// Optional field of the right record to scan for; absent means the
    /// left value is used directly as the target's lookup key.
    pub right_field: Option<String>,
}

impl Join {
    pub(crate) fn new(
        db: &str,
        join_name: &str,
        left_field: &str,
        right_field: Option<&str>,
    ) -> VarveResult<Self> {
        for (label, value) in [("db", db), ("joinName", join_name), ("leftField", left_field)] {
            if value.is_empty() {
                return Err(VarveError::invalid_argument(format!(
                    "join argument '{label}' must not be empty"
                )));
            }
        }
        if right_field == Some("") {
            return Err(VarveError::invalid_argument(
                "join argument 'rightField' must not be empty",
            ));
        }
        Ok(Join {
            db: db.to_string(),
            join_name: join_name.to_string(),
            left_field: left_field.to_string(),
            right_field: right_field.map(str::to_string),
        })
    }
}

/// Materialize the joined view for `left`: one `{join_name: record}`
/// entry per join (null when the target has no match), with the left
/// record's own fields overlaid on top.
pub(crate) fn resolve(registry: &Database, joins: &[Join], left: &Value) -> VarveResult<Value> {
    let mut merged = Map::new();
    for join in joins {
        let target = registry.get_partition_by_name(&join.db)?;
        let left_value = left.get(&join.left_field);
        let right = match (&join.right_field, left_value) {
            (Some(right_field), Some(left_value)) => target
                .data()
                .into_values()
                .find(|record| record.get(right_field.as_str()) == Some(left_value)),
            (None, Some(left_value)) => {
                coerce_index_string(left_value).and_then(|key| target.get(&key))
            }
            (_, None) => None,
        };
        merged.insert(join.join_name.clone(), right.unwrap_or(Value::Null));
    }
    if let Some(fields) = left.as_object() {
        for (name, value) in fields {
            merged.insert(name.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}
