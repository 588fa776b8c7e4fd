//! Telemetry pipeline - schema in, validated view out
//!
//! One pipeline per subscription. It owns the snapshot for the live
//! connection and re-validates after every merged batch.

use std::marker::PhantomData;

use serde_json::Value;
use tracing::trace;

use super::schema::{Schema, SchemaError};
use super::snapshot::Snapshot;
use super::validate::{project, validate, TelemetryView};

pub struct Pipeline<V> {
    schema: Schema,
    snapshot: Snapshot,
    _view: PhantomData<fn() -> V>,
}

impl<V: TelemetryView> Pipeline<V> {
    /// Build the schema from the view's declared fields
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self::with_schema(Schema::new(V::fields())?))
    }

    pub fn with_schema(schema: Schema) -> Self {
        let snapshot = Snapshot::with_keys(schema.keys().iter().cloned());
        Self {
            schema,
            snapshot,
            _view: PhantomData,
        }
    }

    /// Merge a batch and project the result
    pub fn ingest(&mut self, batch: Vec<(String, Value)>) -> Option<V> {
        let applied = self.snapshot.merge(batch);
        trace!(
            applied,
            known = self.snapshot.len(),
            "[PIPELINE] Merged batch"
        );
        self.view()
    }

    /// Project the current snapshot without merging
    pub fn view(&self) -> Option<V> {
        project(&self.schema, &self.snapshot)
    }

    /// Untyped projection of the current snapshot
    pub fn tree(&self) -> Option<Value> {
        validate(&self.schema, &self.snapshot)
    }

    /// Drop everything accumulated so far
    pub fn reset(&mut self) {
        self.snapshot.reset();
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldSpec;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Gear {
        realtime: GearRealtime,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct GearRealtime {
        gear: i32,
        rpm: f64,
    }

    impl TelemetryView for Gear {
        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::integer("realtime.gear"),
                FieldSpec::number("realtime.rpm"),
            ]
        }
    }

    fn pairs(items: &[(&str, Value)]) -> Vec<(String, Value)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_ingest_until_ready() {
        let mut pipeline = Pipeline::<Gear>::new().unwrap();
        assert_eq!(pipeline.ingest(pairs(&[("realtime.gear", json!(2))])), None);
        assert_eq!(
            pipeline.ingest(pairs(&[("realtime.rpm", json!(6500.0))])),
            Some(Gear {
                realtime: GearRealtime {
                    gear: 2,
                    rpm: 6500.0
                }
            })
        );
    }

    #[test]
    fn test_unsubscribed_keys_are_not_stored() {
        let mut pipeline = Pipeline::<Gear>::new().unwrap();
        pipeline.ingest(pairs(&[("realtime.speedKph", json!(120))]));
        assert!(pipeline.snapshot().is_empty());
    }

    #[test]
    fn test_reset_withholds_view() {
        let mut pipeline = Pipeline::<Gear>::new().unwrap();
        pipeline.ingest(pairs(&[
            ("realtime.gear", json!(4)),
            ("realtime.rpm", json!(7000)),
        ]));
        assert!(pipeline.view().is_some());

        pipeline.reset();
        assert!(pipeline.view().is_none());
        assert!(pipeline.tree().is_none());
    }

    #[test]
    fn test_schema_keys_follow_view_fields() {
        let pipeline = Pipeline::<Gear>::new().unwrap();
        assert_eq!(pipeline.schema().keys(), &["realtime.gear", "realtime.rpm"]);
    }
}
