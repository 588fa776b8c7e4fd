//! Field schema - the declared shape of a widget's telemetry subscription
//!
//! A schema is an ordered list of field specs grouped by root. Each root is
//! either a scalar record (`realtime.*`) or a per-entity array (`drivers[].*`).

use std::collections::HashSet;

use thiserror::Error;

use super::field::{FieldKey, FieldKind, FieldSpec};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid field key `{0}`")]
    InvalidKey(String),
    #[error("field key `{0}` is declared twice")]
    DuplicateKey(String),
    #[error("root `{0}` mixes scalar and array fields")]
    MixedRoot(String),
    #[error("field `{0}` overlaps the path of `{1}`")]
    PathConflict(String, String),
    #[error("schema declares no fields")]
    Empty,
}

/// A field spec with its key parsed
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub key: FieldKey,
    pub spec: FieldSpec,
}

impl SchemaField {
    pub fn kind(&self) -> &FieldKind {
        &self.spec.kind
    }

    pub fn is_optional(&self) -> bool {
        self.spec.optional
    }
}

/// Fields sharing a root, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct RootGroup {
    pub name: String,
    pub is_array: bool,
    pub fields: Vec<SchemaField>,
}

impl RootGroup {
    pub fn required(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(|f| !f.is_optional())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    groups: Vec<RootGroup>,
    keys: Vec<String>,
}

impl Schema {
    pub fn new<I>(specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        let mut groups: Vec<RootGroup> = Vec::new();
        let mut keys = Vec::new();
        let mut seen = HashSet::new();

        for spec in specs {
            let key = FieldKey::parse(&spec.key)?;
            if !seen.insert(spec.key.clone()) {
                return Err(SchemaError::DuplicateKey(spec.key));
            }

            let field = SchemaField {
                key: key.clone(),
                spec: spec.clone(),
            };

            match groups.iter_mut().find(|g| g.name == key.root()) {
                Some(group) => {
                    if group.is_array != key.is_array() {
                        return Err(SchemaError::MixedRoot(group.name.clone()));
                    }
                    if let Some(other) = group
                        .fields
                        .iter()
                        .find(|f| paths_overlap(f.key.path(), key.path()))
                    {
                        return Err(SchemaError::PathConflict(
                            spec.key.clone(),
                            other.key.to_string(),
                        ));
                    }
                    group.fields.push(field);
                }
                None => groups.push(RootGroup {
                    name: key.root().to_string(),
                    is_array: key.is_array(),
                    fields: vec![field],
                }),
            }
            keys.push(spec.key);
        }

        if keys.is_empty() {
            return Err(SchemaError::Empty);
        }

        Ok(Self { groups, keys })
    }

    /// Root groups in first-appearance order
    pub fn groups(&self) -> &[RootGroup] {
        &self.groups
    }

    /// Subscription keys in declaration order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// One path is a strict prefix of the other (`lapTimes` vs `lapTimes.best`)
fn paths_overlap(a: &[String], b: &[String]) -> bool {
    let n = a.len().min(b.len());
    a.len() != b.len() && a[..n] == b[..n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_in_first_appearance_order() {
        let schema = Schema::new(vec![
            FieldSpec::integer("drivers[].carId"),
            FieldSpec::number("realtime.throttle"),
            FieldSpec::string("drivers[].firstName"),
            FieldSpec::number("realtime.brake").optional(),
        ])
        .unwrap();

        let names: Vec<&str> = schema.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["drivers", "realtime"]);
        assert!(schema.groups()[0].is_array);
        assert!(!schema.groups()[1].is_array);
        assert_eq!(schema.groups()[0].fields.len(), 2);
        assert_eq!(schema.groups()[1].required().count(), 1);
    }

    #[test]
    fn test_keys_keep_declaration_order() {
        let schema = Schema::new(vec![
            FieldSpec::number("realtime.throttle"),
            FieldSpec::number("realtime.brake"),
            FieldSpec::integer("realtime.gear"),
        ])
        .unwrap();
        assert_eq!(
            schema.keys(),
            &["realtime.throttle", "realtime.brake", "realtime.gear"]
        );
        assert!(schema.contains_key("realtime.gear"));
        assert!(!schema.contains_key("realtime.rpm"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = Schema::new(vec![
            FieldSpec::number("realtime.gear"),
            FieldSpec::integer("realtime.gear"),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateKey("realtime.gear".to_string()));
    }

    #[test]
    fn test_mixed_root_rejected() {
        let err = Schema::new(vec![
            FieldSpec::number("drivers[].position"),
            FieldSpec::number("drivers.count"),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::MixedRoot("drivers".to_string()));
    }

    #[test]
    fn test_path_conflict_rejected() {
        let err = Schema::new(vec![
            FieldSpec::number("realtime.lapTimes"),
            FieldSpec::number("realtime.lapTimes.lapBestLap"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::PathConflict(_, _)));
    }

    #[test]
    fn test_sibling_nested_paths_allowed() {
        let schema = Schema::new(vec![
            FieldSpec::number("realtime.lapTimes.lapBestLap"),
            FieldSpec::number("realtime.lapTimes.lapBestLapTime"),
        ]);
        assert!(schema.is_ok());
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert_eq!(Schema::new(Vec::new()).unwrap_err(), SchemaError::Empty);
    }

    #[test]
    fn test_invalid_key_propagates() {
        let err = Schema::new(vec![FieldSpec::number("throttle")]).unwrap_err();
        assert_eq!(err, SchemaError::InvalidKey("throttle".to_string()));
    }
}
