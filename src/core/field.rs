//! Telemetry field keys and field kinds
//!
//! A field key names one value published by the telemetry server:
//! `realtime.throttle` is a scalar, `drivers[].lapDistPct` is one column of a
//! per-entity parallel array. Nested paths (`realtime.lapTimes.lapBestLap`)
//! become nested objects in the validated view.

use serde_json::Value;

use super::schema::SchemaError;

// =============================================================================
// FIELD KEY
// =============================================================================

/// Marker that turns a root into a per-entity array root
const ARRAY_MARKER: &str = "[]";

/// Parsed field key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    raw: String,
    root: String,
    path: Vec<String>,
    is_array: bool,
}

impl FieldKey {
    /// Parse `root.path` or `root[].path`
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let invalid = || SchemaError::InvalidKey(raw.to_string());

        let (root, rest) = raw.split_once('.').ok_or_else(invalid)?;
        let (root, is_array) = match root.strip_suffix(ARRAY_MARKER) {
            Some(stripped) => (stripped, true),
            None => (root, false),
        };

        if root.is_empty() || root.contains(ARRAY_MARKER) || rest.contains(ARRAY_MARKER) {
            return Err(invalid());
        }

        let path: Vec<String> = rest.split('.').map(str::to_string).collect();
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(invalid());
        }

        Ok(Self {
            raw: raw.to_string(),
            root: root.to_string(),
            path,
            is_array,
        })
    }

    /// The key as sent to and received from the server
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Path segments below the root
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

// =============================================================================
// FIELD KIND
// =============================================================================

/// Expected runtime type of a field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Any JSON number
    Number,
    /// A JSON number without fractional part
    Integer,
    String,
    Boolean,
    /// A string restricted to an explicit set of values
    Enum(Vec<String>),
}

impl FieldKind {
    pub fn enumeration(values: &[&str]) -> Self {
        FieldKind::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// Type-check a value, returning its normalized form when it matches.
    ///
    /// Integers sent as `3.0` are normalized to `3`; integers outside the
    /// `i64` range do not match. Enum values outside the allowed set do not
    /// match.
    pub fn check(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldKind::Number, Value::Number(_)) => Some(value.clone()),
            (FieldKind::Integer, Value::Number(n)) => {
                if n.is_i64() {
                    return Some(value.clone());
                }
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(Value::from(f as i64))
                } else {
                    None
                }
            }
            (FieldKind::String, Value::String(_)) => Some(value.clone()),
            (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (FieldKind::Enum(allowed), Value::String(s)) => {
                allowed.iter().any(|a| a == s).then(|| value.clone())
            }
            _ => None,
        }
    }
}

// =============================================================================
// FIELD SPEC
// =============================================================================

/// Declaration of one subscribed field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: String,
    pub kind: FieldKind,
    /// Optional fields never block readiness; they project to `null` when absent
    pub optional: bool,
    /// Reject negative numbers (the server publishes `-1` for "invalid")
    pub non_negative: bool,
}

impl FieldSpec {
    pub fn new(key: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
            optional: false,
            non_negative: false,
        }
    }

    pub fn number(key: &str) -> Self {
        Self::new(key, FieldKind::Number)
    }

    pub fn integer(key: &str) -> Self {
        Self::new(key, FieldKind::Integer)
    }

    pub fn string(key: &str) -> Self {
        Self::new(key, FieldKind::String)
    }

    pub fn boolean(key: &str) -> Self {
        Self::new(key, FieldKind::Boolean)
    }

    pub fn enumeration(key: &str, values: &[&str]) -> Self {
        Self::new(key, FieldKind::enumeration(values))
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }

    /// Full check of a single value: kind, enum membership and sign constraint
    pub fn accept(&self, value: &Value) -> Option<Value> {
        let checked = self.kind.check(value)?;
        if self.non_negative && checked.as_f64().is_some_and(|n| n < 0.0) {
            return None;
        }
        Some(checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -------------------------------------------------------------------------
    // Key parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_scalar_key() {
        let key = FieldKey::parse("realtime.throttle").unwrap();
        assert_eq!(key.root(), "realtime");
        assert_eq!(key.path(), &["throttle".to_string()]);
        assert!(!key.is_array());
        assert_eq!(key.as_str(), "realtime.throttle");
    }

    #[test]
    fn test_parse_array_key() {
        let key = FieldKey::parse("drivers[].lapDistPct").unwrap();
        assert_eq!(key.root(), "drivers");
        assert_eq!(key.path(), &["lapDistPct".to_string()]);
        assert!(key.is_array());
    }

    #[test]
    fn test_parse_nested_key() {
        let key = FieldKey::parse("realtime.lapTimes.lapBestLap").unwrap();
        assert_eq!(key.root(), "realtime");
        assert_eq!(
            key.path(),
            &["lapTimes".to_string(), "lapBestLap".to_string()]
        );
    }

    #[test]
    fn test_parse_invalid_keys() {
        for raw in [
            "throttle",
            ".throttle",
            "realtime.",
            "[].x",
            "realtime..gear",
            "drivers[].laps[].x",
            "dri[]vers.x",
        ] {
            assert!(
                matches!(FieldKey::parse(raw), Err(SchemaError::InvalidKey(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    // -------------------------------------------------------------------------
    // Kind checks
    // -------------------------------------------------------------------------

    #[test]
    fn test_number_kind() {
        assert_eq!(FieldKind::Number.check(&json!(0.5)), Some(json!(0.5)));
        assert_eq!(FieldKind::Number.check(&json!(3)), Some(json!(3)));
        assert_eq!(FieldKind::Number.check(&json!("0.5")), None);
        assert_eq!(FieldKind::Number.check(&Value::Null), None);
    }

    #[test]
    fn test_integer_kind_normalizes_whole_floats() {
        assert_eq!(FieldKind::Integer.check(&json!(3)), Some(json!(3)));
        assert_eq!(FieldKind::Integer.check(&json!(3.0)), Some(json!(3)));
        assert_eq!(FieldKind::Integer.check(&json!(-1.0)), Some(json!(-1)));
        assert_eq!(FieldKind::Integer.check(&json!(2.5)), None);
    }

    #[test]
    fn test_integer_kind_rejects_values_beyond_i64() {
        assert_eq!(FieldKind::Integer.check(&json!(i64::MAX)), Some(json!(i64::MAX)));
        assert_eq!(FieldKind::Integer.check(&json!(u64::MAX)), None);
        assert_eq!(FieldKind::Integer.check(&json!(1e19)), None);
    }

    #[test]
    fn test_string_and_boolean_kinds() {
        assert_eq!(FieldKind::String.check(&json!("RACE")), Some(json!("RACE")));
        assert_eq!(FieldKind::String.check(&json!(1)), None);
        assert_eq!(FieldKind::Boolean.check(&json!(true)), Some(json!(true)));
        assert_eq!(FieldKind::Boolean.check(&json!(0)), None);
    }

    #[test]
    fn test_enum_kind_membership() {
        let units = FieldKind::enumeration(&["IMPERIAL", "METRIC"]);
        assert_eq!(units.check(&json!("METRIC")), Some(json!("METRIC")));
        assert_eq!(units.check(&json!("KELVIN")), None);
        assert_eq!(units.check(&json!("metric")), None);
        assert_eq!(units.check(&json!(1)), None);
    }

    #[test]
    fn test_non_negative_spec() {
        let spec = FieldSpec::number("drivers[].lapDistPct").non_negative();
        assert_eq!(spec.accept(&json!(0.25)), Some(json!(0.25)));
        assert_eq!(spec.accept(&json!(0)), Some(json!(0)));
        assert_eq!(spec.accept(&json!(-1)), None);

        let signed = FieldSpec::number("realtime.steeringAnglePct");
        assert_eq!(signed.accept(&json!(-0.2)), Some(json!(-0.2)));
    }
}
