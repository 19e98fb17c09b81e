use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored document: a store-assigned id plus its fields as plain JSON.
///
/// Timestamps are carried as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Full point-in-time copy of a collection, in the store's order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

/// A document to be written. Fields listed in `server_timestamps` are filled
/// in by the store with its own clock at commit time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDocument {
    pub fields: Map<String, Value>,
    pub server_timestamps: Vec<String>,
}

impl NewDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        self.server_timestamps.push(name.into());
        self
    }
}
