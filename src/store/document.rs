//! The shared state document.

use chrono::Utc;
use serde_json::{Map, Value};

/// A schemaless JSON object holding the whole application state.
pub type Document = Map<String, Value>;

/// Reserved field overwritten on every write (epoch milliseconds).
pub const UPDATED_AT: &str = "updatedAt";

/// The empty application state.
///
/// Used when nothing was ever saved and when the stored text is unreadable.
pub fn default_document() -> Document {
    let mut doc = Document::new();
    doc.insert("todos".into(), Value::Array(Vec::new()));
    doc.insert("bedtime".into(), Value::Null);
    doc.insert("timers".into(), Value::Object(Map::new()));
    doc.insert(UPDATED_AT.into(), Value::from(0));
    doc
}

/// Parses stored text into a document.
///
/// Anything that is not a JSON object yields `None`.
pub fn parse_document(raw: &str) -> Option<Document> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(doc)) => Some(doc),
        _ => None,
    }
}

/// Accepts a request body as a document if it is a JSON object.
pub fn into_document(value: Value) -> Option<Document> {
    match value {
        Value::Object(doc) => Some(doc),
        _ => None,
    }
}

/// Overwrites `updatedAt` with `now_millis`.
pub fn stamp(doc: &mut Document, now_millis: i64) {
    doc.insert(UPDATED_AT.into(), Value::from(now_millis));
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
