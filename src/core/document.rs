//! Document helpers
//!
//! Records are schemaless JSON objects. The identifier lives under `_id`.

use serde_json::Value;
use uuid::Uuid;

/// A single record.
pub type Document = Value;

/// Field holding a record's stable identifier
pub const ID_FIELD: &str = "_id";

/// Get a record's identifier, if it has one
///
/// String identifiers are returned as-is, numeric ones are stringified so
/// that comparisons between records never depend on the JSON type.
pub fn document_id(doc: &Document) -> Option<String> {
    match doc.get(ID_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Generate a fresh record identifier
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}
