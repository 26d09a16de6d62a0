//! Schema inference over sampled collection documents
//!
//! Collections are schema-less, so the shape of the data can only be described
//! empirically. This module scans a bounded sample of documents and summarizes,
//! per field, which value kinds were observed, how often, and a few example
//! values. Arrays are classified as `array` without looking at their elements.
//!
//! Inference is a pure function over an in-memory sample. Sampling, counting and
//! sample-size bounds are the caller's concern (see
//! [`crate::services::SchemaService`]).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A schema-less document: field name to dynamically-typed value, in field order.
pub type Document = Map<String, Value>;

/// Number of example values retained per field.
pub const MAX_EXAMPLES: usize = 3;

/// Runtime kind of a value, as reported in schema summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl TypeTag {
    /// Classify a value. Arrays are tagged as a whole; elements are not inspected.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => TypeTag::Array,
            Value::String(_) => TypeTag::String,
            Value::Number(_) => TypeTag::Number,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Object(_) => TypeTag::Object,
            Value::Null => TypeTag::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Null => "null",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed types, examples and per-type counts for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    /// Distinct type tags in first-seen order
    #[schema(value_type = Vec<TypeTag>)]
    pub types: IndexSet<TypeTag>,

    /// Up to three raw values, in scan order
    #[schema(value_type = Vec<Object>)]
    pub examples: Vec<Value>,

    /// Occurrences per type tag
    #[schema(value_type = Object)]
    pub type_count: IndexMap<TypeTag, u64>,
}

impl FieldSummary {
    /// Record one occurrence of this field.
    fn observe(&mut self, value: &Value) {
        let tag = TypeTag::of(value);
        self.types.insert(tag);
        *self.type_count.entry(tag).or_insert(0) += 1;

        if self.examples.len() < MAX_EXAMPLES {
            self.examples.push(value.clone());
        }
    }

    /// Number of sampled documents that contained this field.
    pub fn occurrences(&self) -> u64 {
        self.type_count.values().sum()
    }
}

/// Per-field summary of a collection sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    /// Field summaries keyed by field name, in first-seen order
    #[schema(value_type = Object)]
    pub schema: IndexMap<String, FieldSummary>,

    /// Number of documents the summary was computed from
    pub sample_size: u64,

    /// Document count of the whole collection
    pub total_documents: u64,
}

impl SchemaReport {
    pub fn is_empty(&self) -> bool {
        self.sample_size == 0
    }

    pub fn field(&self, name: &str) -> Option<&FieldSummary> {
        self.schema.get(name)
    }
}

/// Summarize the fields of a document sample.
///
/// `total_count` is reported alongside the sample size so callers can judge how
/// representative the summary is; it may exceed `sample.len()`.
pub fn infer_schema(sample: &[Document], total_count: u64) -> SchemaReport {
    let mut schema: IndexMap<String, FieldSummary> = IndexMap::new();

    for document in sample {
        for (field, value) in document {
            match schema.get_mut(field) {
                Some(summary) => summary.observe(value),
                None => {
                    let mut summary = FieldSummary::default();
                    summary.observe(value);
                    schema.insert(field.clone(), summary);
                }
            }
        }
    }

    SchemaReport { schema, sample_size: sample.len() as u64, total_documents: total_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_empty_sample() {
        let report = infer_schema(&[], 0);
        assert!(report.schema.is_empty());
        assert_eq!(report.sample_size, 0);
        assert_eq!(report.total_documents, 0);
        assert!(report.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, json!({"schema": {}, "sampleSize": 0, "totalDocuments": 0}));
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(TypeTag::of(&json!("x")), TypeTag::String);
        assert_eq!(TypeTag::of(&json!(1)), TypeTag::Number);
        assert_eq!(TypeTag::of(&json!(1.5)), TypeTag::Number);
        assert_eq!(TypeTag::of(&json!(true)), TypeTag::Boolean);
        assert_eq!(TypeTag::of(&json!({"k": 1})), TypeTag::Object);
        assert_eq!(TypeTag::of(&json!([1, "a"])), TypeTag::Array);
        assert_eq!(TypeTag::of(&Value::Null), TypeTag::Null);
    }

    #[test]
    fn test_mixed_types() {
        let sample = vec![doc(json!({"a": 1})), doc(json!({"a": "x"})), doc(json!({"a": [1, 2]}))];
        let report = infer_schema(&sample, 3);

        let a = report.field("a").unwrap();
        let types: Vec<TypeTag> = a.types.iter().copied().collect();
        assert_eq!(types, vec![TypeTag::Number, TypeTag::String, TypeTag::Array]);
        assert_eq!(a.type_count[&TypeTag::Number], 1);
        assert_eq!(a.type_count[&TypeTag::String], 1);
        assert_eq!(a.type_count[&TypeTag::Array], 1);
    }

    #[test]
    fn test_sparse_fields() {
        let sample = vec![doc(json!({"a": 1})), doc(json!({"b": 2}))];
        let report = infer_schema(&sample, 2);

        assert_eq!(report.field("a").unwrap().occurrences(), 1);
        assert_eq!(report.field("b").unwrap().occurrences(), 1);
        assert_eq!(report.sample_size, 2);
    }

    #[test]
    fn test_repeated_type_counts_but_not_duplicated_in_set() {
        let sample = vec![
            doc(json!({"n": 1})),
            doc(json!({"n": 2})),
            doc(json!({"n": 3})),
            doc(json!({"n": 4})),
        ];
        let report = infer_schema(&sample, 10);

        let n = report.field("n").unwrap();
        assert_eq!(n.types.len(), 1);
        assert_eq!(n.type_count[&TypeTag::Number], 4);
        assert_eq!(n.examples, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(report.total_documents, 10);
    }

    #[test]
    fn test_examples_keep_nested_values_as_is() {
        let sample = vec![
            doc(json!({"meta": {"tags": ["a", "b"]}})),
            doc(json!({"meta": null})),
        ];
        let report = infer_schema(&sample, 2);

        let meta = report.field("meta").unwrap();
        assert_eq!(meta.examples, vec![json!({"tags": ["a", "b"]}), Value::Null]);
        let types: Vec<TypeTag> = meta.types.iter().copied().collect();
        assert_eq!(types, vec![TypeTag::Object, TypeTag::Null]);
    }

    #[test]
    fn test_fields_reported_in_first_seen_order() {
        let sample = vec![doc(json!({"b": 1, "a": 1})), doc(json!({"c": 1, "a": 2}))];
        let report = infer_schema(&sample, 2);

        let fields: Vec<&str> = report.schema.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_report_serialization_shape() {
        let sample = vec![doc(json!({"name": "Ada", "tags": ["x"]}))];
        let report = infer_schema(&sample, 42);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["sampleSize"], 1);
        assert_eq!(json["totalDocuments"], 42);
        assert_eq!(json["schema"]["name"]["types"], json!(["string"]));
        assert_eq!(json["schema"]["name"]["examples"], json!(["Ada"]));
        assert_eq!(json["schema"]["name"]["typeCount"], json!({"string": 1}));
        assert_eq!(json["schema"]["tags"]["types"], json!(["array"]));
    }

    #[test]
    fn test_inference_is_idempotent() {
        let sample = vec![doc(json!({"a": 1, "b": "x"})), doc(json!({"a": true}))];
        assert_eq!(infer_schema(&sample, 2), infer_schema(&sample, 2));
    }

    #[test]
    fn test_input_not_mutated() {
        let sample = vec![doc(json!({"a": [1, 2, 3]}))];
        let before = sample.clone();
        let _ = infer_schema(&sample, 1);
        assert_eq!(sample, before);
    }
}
