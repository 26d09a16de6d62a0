//! Export rendering and import modes for whole-collection transfers.

use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// Body returned by a CSV export of an empty collection
pub const EMPTY_EXPORT: &str = "No data to export";

/// Output format of a collection export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Parse the `format` query parameter; absent means JSON.
    pub fn from_param(value: Option<&str>) -> Result<Self> {
        match value.unwrap_or("json") {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(Error::validation("Unsupported format. Use json or csv")),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// `Content-Disposition` value naming the download after the collection
    pub fn attachment(&self, collection: &str) -> String {
        let safe: String = collection
            .chars()
            .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
            .collect();
        format!("attachment; filename=\"{}.{}\"", safe, self.extension())
    }

    pub fn render(&self, documents: &[Map<String, Value>]) -> Result<String> {
        match self {
            ExportFormat::Json => render_json(documents),
            ExportFormat::Csv => {
                Ok(render_csv(documents)?.unwrap_or_else(|| EMPTY_EXPORT.to_string()))
            }
        }
    }
}

/// How imported documents are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    #[default]
    Insert,
    /// Replace fields of documents with a matching `_id`, insert the rest
    Upsert,
}

impl ImportMode {
    pub fn from_param(value: Option<&str>) -> Result<Self> {
        match value.unwrap_or("insert") {
            "insert" => Ok(ImportMode::Insert),
            "upsert" => Ok(ImportMode::Upsert),
            _ => Err(Error::validation("Invalid mode. Use insert or upsert")),
        }
    }
}

/// Pretty-printed JSON array of the documents
pub fn render_json(documents: &[Map<String, Value>]) -> Result<String> {
    serde_json::to_string_pretty(documents).map_err(|e| Error::Serialization {
        source: e,
        context: "Failed to render JSON export".to_string(),
    })
}

/// CSV with a header taken from the first document's fields.
///
/// Returns `None` for an empty collection. Nested values and nulls are written
/// as JSON text; fields missing from a document are left empty.
pub fn render_csv(documents: &[Map<String, Value>]) -> Result<Option<String>> {
    let Some(first) = documents.first() else {
        return Ok(None);
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&headers).map_err(csv_error)?;
    for document in documents {
        let row = headers
            .iter()
            .map(|header| document.get(*header).map(csv_cell).unwrap_or_default());
        writer.write_record(row).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::internal(format!("Failed to flush CSV export: {}", e)))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| Error::internal(format!("CSV export is not valid UTF-8: {}", e)))
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn csv_error(error: csv::Error) -> Error {
    Error::internal(format!("Failed to write CSV export: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => map,
                _ => panic!("expected object"),
            })
            .collect()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::from_param(None).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_param(Some("csv")).unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::from_param(Some("xml")).is_err());
    }

    #[test]
    fn test_attachment_header() {
        assert_eq!(ExportFormat::Csv.attachment("users"), "attachment; filename=\"users.csv\"");
        assert_eq!(ExportFormat::Json.attachment("a\"b"), "attachment; filename=\"a_b.json\"");
    }

    #[test]
    fn test_csv_header_from_first_document() {
        let documents = docs(vec![
            json!({"name": "Ada", "age": 36, "tags": ["math"], "extra": null}),
            json!({"name": "Grace, Admiral", "nested": {"x": 1}}),
        ]);

        let csv = render_csv(&documents).unwrap().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,age,tags,extra");
        assert_eq!(lines[1], "Ada,36,\"[\"\"math\"\"]\",null");
        assert_eq!(lines[2], "\"Grace, Admiral\",,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_empty_collection() {
        assert_eq!(render_csv(&[]).unwrap(), None);
        assert_eq!(ExportFormat::Csv.render(&[]).unwrap(), EMPTY_EXPORT);
    }

    #[test]
    fn test_json_export_is_pretty_array() {
        let documents = docs(vec![json!({"a": 1})]);
        let rendered = render_json(&documents).unwrap();
        assert_eq!(rendered, "[\n  {\n    \"a\": 1\n  }\n]");
        assert_eq!(ExportFormat::Json.render(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_import_mode_parsing() {
        assert_eq!(ImportMode::from_param(None).unwrap(), ImportMode::Insert);
        assert_eq!(ImportMode::from_param(Some("upsert")).unwrap(), ImportMode::Upsert);
        assert!(ImportMode::from_param(Some("merge")).is_err());
    }
}
