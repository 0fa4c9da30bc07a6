//! Record → JSON message encoding.
//!
//! Encoding never fails on content: binary values that are not valid UTF-8
//! are decoded with replacement characters, and non-finite doubles become
//! `null`. Field order follows the record.

use bson::{Bson, Document};
use serde_json::{Map, Number, Value};

use crate::Result;

/// Serialize a record as a UTF-8 JSON string.
pub fn encode_payload(record: &Document) -> Result<String> {
    Ok(serde_json::to_string(&document_to_json(record))?)
}

pub fn document_to_json(doc: &Document) -> Value {
    Value::Object(
        doc.iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect::<Map<String, Value>>(),
    )
}

fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::String(s) | Bson::Symbol(s) => Value::String(s.clone()),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Binary(binary) => Value::String(String::from_utf8_lossy(&binary.bytes).into_owned()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map_or_else(|_| Value::from(dt.timestamp_millis()), Value::String),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => other.clone().into_relaxed_extjson(),
    }
}
