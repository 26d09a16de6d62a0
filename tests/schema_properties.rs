//! Property tests for schema inference over generated document samples.

use mongorest::schema::{infer_schema, Document, TypeTag, MAX_EXAMPLES};
use proptest::prelude::*;
use serde_json::{json, Value};

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn field_value() -> impl Strategy<Value = Value> {
    leaf_value().prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::btree_map("[a-e]", field_value(), 0..5)
        .prop_map(|fields| fields.into_iter().collect())
}

fn sample() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec(document(), 0..12)
}

proptest! {
    #[test]
    fn every_present_field_is_reported_once(docs in sample()) {
        let report = infer_schema(&docs, docs.len() as u64);

        for doc in &docs {
            for field in doc.keys() {
                prop_assert!(report.schema.contains_key(field));
            }
        }
        for field in report.schema.keys() {
            prop_assert!(docs.iter().any(|doc| doc.contains_key(field)));
        }
        prop_assert_eq!(report.sample_size, docs.len() as u64);
    }

    #[test]
    fn examples_are_first_occurrences(docs in sample()) {
        let report = infer_schema(&docs, docs.len() as u64);

        for (field, summary) in &report.schema {
            let expected: Vec<Value> = docs
                .iter()
                .filter_map(|doc| doc.get(field).cloned())
                .take(MAX_EXAMPLES)
                .collect();
            prop_assert!(summary.examples.len() <= MAX_EXAMPLES);
            prop_assert_eq!(&summary.examples, &expected);
        }
    }

    #[test]
    fn type_counts_sum_to_presence(docs in sample()) {
        let report = infer_schema(&docs, docs.len() as u64);

        for (field, summary) in &report.schema {
            let present = docs.iter().filter(|doc| doc.contains_key(field)).count() as u64;
            prop_assert_eq!(summary.occurrences(), present);
            prop_assert_eq!(summary.types.len(), summary.type_count.len());
            for tag in &summary.types {
                prop_assert!(summary.type_count[tag] >= 1);
            }
        }
    }

    #[test]
    fn inference_is_idempotent(docs in sample(), total in 0u64..10_000) {
        let first = infer_schema(&docs, total);
        let second = infer_schema(&docs, total);
        prop_assert_eq!(first.total_documents, total);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn arrays_are_tagged_without_inspecting_elements() {
    let docs: Vec<Document> = vec![
        json!({"tags": ["a", "b"]}),
        json!({"tags": [1, {"x": true}]}),
        json!({"tags": []}),
    ]
    .into_iter()
    .filter_map(|value| value.as_object().cloned())
    .collect();

    let report = infer_schema(&docs, 3);
    let tags = report.field("tags").unwrap();
    assert_eq!(tags.types.iter().copied().collect::<Vec<_>>(), vec![TypeTag::Array]);
    assert_eq!(tags.type_count[&TypeTag::Array], 3);
}

#[test]
fn report_serializes_in_wire_shape() {
    let docs: Vec<Document> = vec![json!({"name": "Ada", "age": null})]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

    let report = infer_schema(&docs, 40);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(
        value,
        json!({
            "schema": {
                "name": {"types": ["string"], "examples": ["Ada"], "typeCount": {"string": 1}},
                "age": {"types": ["null"], "examples": [null], "typeCount": {"null": 1}}
            },
            "sampleSize": 1,
            "totalDocuments": 40
        })
    );
}
