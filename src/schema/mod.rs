//! Schema inference module for describing schema-less collections
//!
//! Summarizes observed field types and example values from a bounded
//! document sample, so generic clients can render editors and forms without
//! a declared schema.

pub mod inference;

pub use inference::{infer_schema, Document, FieldSummary, SchemaReport, TypeTag, MAX_EXAMPLES};
