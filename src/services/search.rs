//! Search filter construction for the collection search endpoint
//!
//! Field types are not known up front, so a single sample document is used to
//! decide how each field should be matched.

use mongodb::bson::{doc, Bson, Document};
use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// How a `field`/`query` pair is matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchType {
    /// Case-insensitive regular expression
    #[default]
    Text,
    Regex,
    Exact,
    Number,
}

impl SearchType {
    /// Parse the `type` query parameter; unknown values fall back to `Text`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("regex") => SearchType::Regex,
            Some("exact") => SearchType::Exact,
            Some("number") => SearchType::Number,
            _ => SearchType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Text => "text",
            SearchType::Regex => "regex",
            SearchType::Exact => "exact",
            SearchType::Number => "number",
        }
    }
}

/// Build the filter for a search request.
///
/// - `field` and `query`: array fields (judged by `sample`) match by equality,
///   otherwise `search_type` decides.
/// - only `query`: an `$or` over the sample's string fields and string-bearing
///   arrays; `$text` when there is no sample document.
/// - no `query`: match everything.
pub fn build_search_filter(
    query: Option<&str>,
    field: Option<&str>,
    search_type: SearchType,
    sample: Option<&Map<String, Value>>,
) -> Result<Document> {
    let query = match query.filter(|q| !q.is_empty()) {
        Some(query) => query,
        None => return Ok(Document::new()),
    };

    match field.filter(|f| !f.is_empty()) {
        Some(field) => field_filter(field, query, search_type, sample),
        None => Ok(any_field_filter(query, sample)),
    }
}

fn field_filter(
    field: &str,
    query: &str,
    search_type: SearchType,
    sample: Option<&Map<String, Value>>,
) -> Result<Document> {
    let is_array = sample.and_then(|s| s.get(field)).is_some_and(Value::is_array);

    let condition = if is_array {
        Bson::String(query.to_string())
    } else {
        match search_type {
            SearchType::Exact => Bson::String(query.to_string()),
            SearchType::Number => {
                let number = query.trim().parse::<f64>().map_err(|_| {
                    Error::validation(format!("Query '{}' is not a valid number", query))
                })?;
                Bson::Double(number)
            }
            SearchType::Text | SearchType::Regex => Bson::Document(regex(query)),
        }
    };

    Ok(single(field, condition))
}

fn any_field_filter(query: &str, sample: Option<&Map<String, Value>>) -> Document {
    let Some(sample) = sample else {
        return doc! { "$text": { "$search": query } };
    };

    let clauses: Vec<Document> = sample
        .iter()
        .filter_map(|(key, value)| match value {
            Value::String(_) => Some(single(key, Bson::Document(regex(query)))),
            Value::Array(items) if items.iter().any(Value::is_string) => {
                Some(single(key, Bson::String(query.to_string())))
            }
            _ => None,
        })
        .collect();

    if clauses.is_empty() {
        Document::new()
    } else {
        doc! { "$or": clauses }
    }
}

fn single(key: &str, condition: Bson) -> Document {
    let mut filter = Document::new();
    filter.insert(key, condition);
    filter
}

fn regex(pattern: &str) -> Document {
    doc! { "$regex": pattern, "$options": "i" }
}
