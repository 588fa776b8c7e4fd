//! Snapshot validation - projects a snapshot through a schema
//!
//! The result is either a JSON tree shaped like the view-model
//! (`{ "realtime": {...}, "drivers": [{...}, ...] }`) or `None` when the
//! snapshot is not ready yet.
//!
//! # Rules
//!
//! - Scalar roots: a missing or mistyped field is `null`; any required field
//!   being `null` withholds the whole projection.
//! - Enum fields outside the allowed set are treated as absent.
//! - Array roots: every required column must be an array and all required
//!   columns must have the same length, otherwise the projection is withheld.
//!   An entity whose required value fails its check is skipped; an optional
//!   value that fails becomes `null`. A root left with no entity withholds the
//!   projection.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::field::FieldSpec;
use super::schema::{RootGroup, Schema, SchemaField};
use super::snapshot::Snapshot;

// =============================================================================
// TELEMETRY VIEW
// =============================================================================

/// A typed view-model built from validated telemetry
///
/// `fields()` declares the subscription; the validated tree is deserialized
/// into `Self`, so serde names must match the field paths.
pub trait TelemetryView: DeserializeOwned {
    fn fields() -> Vec<FieldSpec>;
}

/// Validate and deserialize into a typed view
pub fn project<V: TelemetryView>(schema: &Schema, snapshot: &Snapshot) -> Option<V> {
    let tree = validate(schema, snapshot)?;
    match serde_json::from_value(tree) {
        Ok(view) => Some(view),
        Err(e) => {
            warn!(error = %e, "[VALIDATE] Validated snapshot does not match view type");
            None
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Project a snapshot through the schema
pub fn validate(schema: &Schema, snapshot: &Snapshot) -> Option<Value> {
    let mut out = Map::new();
    for group in schema.groups() {
        let value = if group.is_array {
            validate_array_root(group, snapshot)?
        } else {
            validate_scalar_root(group, snapshot)?
        };
        out.insert(group.name.clone(), value);
    }
    Some(Value::Object(out))
}

fn validate_scalar_root(group: &RootGroup, snapshot: &Snapshot) -> Option<Value> {
    let mut record = Map::new();
    for field in &group.fields {
        let value = snapshot
            .get(field.key.as_str())
            .and_then(|v| field.spec.accept(v));
        match value {
            Some(v) => insert_path(&mut record, field.key.path(), v),
            None if field.is_optional() => insert_path(&mut record, field.key.path(), Value::Null),
            None => return None,
        }
    }
    Some(Value::Object(record))
}

fn validate_array_root(group: &RootGroup, snapshot: &Snapshot) -> Option<Value> {
    let columns: Vec<(&SchemaField, Option<&Vec<Value>>)> = group
        .fields
        .iter()
        .map(|field| {
            let column = snapshot.get(field.key.as_str()).and_then(Value::as_array);
            (field, column)
        })
        .collect();

    // Required columns decide the entity count
    let mut len: Option<usize> = None;
    for (field, column) in &columns {
        if field.is_optional() {
            continue;
        }
        let column = (*column)?;
        match len {
            None => len = Some(column.len()),
            Some(n) if n != column.len() => return None,
            Some(_) => {}
        }
    }
    // A root with only optional fields follows its longest column
    let len = len.unwrap_or_else(|| {
        columns
            .iter()
            .filter_map(|(_, c)| c.map(|c| c.len()))
            .max()
            .unwrap_or(0)
    });

    let mut entities = Vec::with_capacity(len);
    'entity: for idx in 0..len {
        let mut record = Map::new();
        for (field, column) in &columns {
            let value = column
                .and_then(|c| c.get(idx))
                .and_then(|v| field.spec.accept(v));
            match value {
                Some(v) => insert_path(&mut record, field.key.path(), v),
                None if field.is_optional() => {
                    insert_path(&mut record, field.key.path(), Value::Null)
                }
                None => continue 'entity,
            }
        }
        entities.push(Value::Object(record));
    }

    if entities.is_empty() {
        return None;
    }
    Some(Value::Array(entities))
}

/// Insert `value` under a dotted path, creating intermediate objects
fn insert_path(record: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = record;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.clone(), value);
}

// =============================================================================
// TESTS
// =============================================================================
