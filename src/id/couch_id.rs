//! CouchId - the document id of a CouchDB-style store.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{ModelId, PropertyType};

/// Identifier of a document within one database.
///
/// Always held in string form, which is what the store expects in `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouchId(String);

impl CouchId {
    /// Parse an opaque raw value into an id.
    ///
    /// Strings are taken verbatim; any other value is rendered with its
    /// default string conversion. Never fails.
    pub fn parse(raw: &Value) -> Self {
        match raw {
            Value::String(s) => CouchId(s.clone()),
            other => CouchId(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for CouchId {
    fn from(value: &str) -> Self {
        CouchId(value.to_string())
    }
}

impl From<String> for CouchId {
    fn from(value: String) -> Self {
        CouchId(value)
    }
}

impl fmt::Display for CouchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ModelId for CouchId {
    fn convert(&self, to: PropertyType) -> Option<Value> {
        match to {
            PropertyType::String | PropertyType::Object => Some(Value::String(self.0.clone())),
            PropertyType::Number => {
                if let Ok(int) = self.0.parse::<i64>() {
                    return Some(Value::Number(int.into()));
                }
                self.0
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn boxed_clone(&self) -> Box<dyn ModelId> {
        Box::new(self.clone())
    }
}
