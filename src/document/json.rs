//! Conversion between documents and JSON
//!
//! Integers that fit in i64 become Int, every other number becomes Float.
//! Blobs are written as base64 text and non-finite floats as null, so the
//! conversion to JSON is lossy for those two cases.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Number};

use super::document::Document;
use super::errors::{DocumentError, DocumentResult};
use super::value::Value;

impl Value {
    /// Builds a value from JSON
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Document(document_from_map(map)),
        }
    }

    /// Renders this value as JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Blob(b) => serde_json::Value::String(STANDARD.encode(b)),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Document(d) => d.to_json(),
        }
    }
}

impl Document {
    /// Builds a document from a JSON object
    pub fn from_json(json: &serde_json::Value) -> DocumentResult<Document> {
        match json {
            serde_json::Value::Object(map) => Ok(document_from_map(map)),
            other => Err(DocumentError::NotAnObject(json_kind(other).to_string())),
        }
    }

    /// Parses a JSON object from text
    pub fn from_json_str(text: &str) -> DocumentResult<Document> {
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| DocumentError::NotAnObject(format!("invalid JSON: {}", e)))?;
        Document::from_json(&json)
    }

    /// Renders the document as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = Map::with_capacity(self.len());
        for (name, value) in self.iter() {
            map.insert(name.to_string(), value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

fn document_from_map(map: &Map<String, serde_json::Value>) -> Document {
    let mut doc = Document::with_capacity(map.len());
    for (name, value) in map {
        doc.set(name.clone(), Value::from_json(value));
    }
    doc
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
