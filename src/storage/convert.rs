//! Conversions between request/response JSON and BSON.
//!
//! Incoming JSON is parsed as MongoDB Extended JSON, so `{"$oid": "..."}` and
//! `{"$date": "..."}` arrive as real ObjectIds and dates. Outgoing documents are
//! rendered as relaxed Extended JSON, which keeps them round-trippable.

use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// Render a BSON document as a JSON object.
pub fn document_to_json(document: Document) -> Map<String, Value> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Render any BSON value as JSON.
pub fn bson_to_json(value: Bson) -> Value {
    value.into_relaxed_extjson()
}

/// Parse a JSON value that must be an object into a BSON document.
///
/// `what` names the value in error messages ("filter", "document", ...).
pub fn json_to_document(value: Value, what: &str) -> Result<Document> {
    if !value.is_object() {
        return Err(Error::validation(format!("{} must be a JSON object", capitalize(what))));
    }

    match Bson::try_from(value) {
        Ok(Bson::Document(document)) => Ok(document),
        Ok(_) => Err(Error::validation(format!(
            "{} must be a JSON object, not an Extended JSON scalar",
            capitalize(what)
        ))),
        Err(e) => Err(Error::validation(format!("Invalid {}: {}", what, e))),
    }
}

/// Parse an optional JSON object, treating `None` and `null` as an empty document.
pub fn optional_document(value: Option<Value>, what: &str) -> Result<Document> {
    match value {
        None | Some(Value::Null) => Ok(Document::new()),
        Some(value) => json_to_document(value, what),
    }
}

/// Parse a JSON array of objects into BSON documents.
pub fn json_to_documents(values: Vec<Value>, what: &str) -> Result<Vec<Document>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| json_to_document(value, &format!("{} at index {}", what, index)))
        .collect()
}

/// Interpret a path id as an ObjectId when it parses as one, otherwise as a string id.
pub fn parse_document_id(id: &str) -> Bson {
    ObjectId::parse_str(id).map(Bson::ObjectId).unwrap_or_else(|_| Bson::String(id.to_string()))
}

/// Read a numeric BSON value as i64, truncating doubles.
pub fn bson_as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) => Some(*v as i64),
        _ => None,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn test_json_object_to_document() {
        let document = json_to_document(json!({"name": "Ada", "age": 36}), "document").unwrap();
        assert_eq!(document.get_str("name").unwrap(), "Ada");
        assert_eq!(document.get_i32("age").unwrap(), 36);
    }

    #[test]
    fn test_extended_json_object_id() {
        let hex = "64b7f0c2a1b2c3d4e5f60718";
        let document = json_to_document(json!({"_id": {"$oid": hex}}), "filter").unwrap();
        assert_eq!(document.get_object_id("_id").unwrap().to_hex(), hex);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = json_to_document(json!([1, 2]), "filter").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Filter must be a JSON object");

        assert!(json_to_document(json!("x"), "document").is_err());
        assert!(json_to_document(json!({"$oid": "64b7f0c2a1b2c3d4e5f60718"}), "filter").is_err());
    }

    #[test]
    fn test_optional_document_defaults_to_empty() {
        assert!(optional_document(None, "filter").unwrap().is_empty());
        assert!(optional_document(Some(Value::Null), "filter").unwrap().is_empty());
        assert!(optional_document(Some(json!(5)), "filter").is_err());
    }

    #[test]
    fn test_json_to_documents_reports_index() {
        let err = json_to_documents(vec![json!({"a": 1}), json!(3)], "document").unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_document_to_json_renders_relaxed_extjson() {
        let oid = ObjectId::parse_str("64b7f0c2a1b2c3d4e5f60718").unwrap();
        let json = document_to_json(doc! {"_id": oid, "n": 5_i64, "tags": ["a"]});
        assert_eq!(json["_id"], json!({"$oid": "64b7f0c2a1b2c3d4e5f60718"}));
        assert_eq!(json["n"], json!(5));
        assert_eq!(json["tags"], json!(["a"]));
    }

    #[test]
    fn test_parse_document_id() {
        assert!(matches!(parse_document_id("64b7f0c2a1b2c3d4e5f60718"), Bson::ObjectId(_)));
        assert_eq!(parse_document_id("user-42"), Bson::String("user-42".to_string()));
    }

    #[test]
    fn test_bson_as_i64() {
        assert_eq!(bson_as_i64(&Bson::Int32(4)), Some(4));
        assert_eq!(bson_as_i64(&Bson::Int64(7)), Some(7));
        assert_eq!(bson_as_i64(&Bson::Double(2.9)), Some(2));
        assert_eq!(bson_as_i64(&Bson::String("1".into())), None);
    }
}
