//! Field type handlers.
//!
//! Stateless functions normalising raw attribute values into the wire form
//! expected by a field type class. Handlers never recover from malformed
//! input; the extractor decides what to do with their errors.

mod date;

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use solr_indexer_shared::AttributeValue;

pub use date::{date_handler, format_utc};

/// Why a handler rejected a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The value is null or empty; the field is skipped.
    #[error("missing value")]
    MissingValue,

    /// The value cannot be represented by the field type.
    #[error("malformed value: {0}")]
    Malformed(String),
}

impl HandlerError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Signature shared by all field type handlers.
pub type FieldHandler = fn(AttributeValue) -> Result<Value, HandlerError>;

/// Integer fields accept anything except null and the empty string.
pub fn int_handler(value: AttributeValue) -> Result<Value, HandlerError> {
    match &value {
        AttributeValue::Null => Err(HandlerError::MissingValue),
        AttributeValue::Text(s) if s.is_empty() => Err(HandlerError::MissingValue),
        AttributeValue::Bytes(b) if b.is_empty() => Err(HandlerError::MissingValue),
        _ => Ok(value.into_wire()),
    }
}

/// Handlers keyed by field type class.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, FieldHandler>,
}

impl HandlerRegistry {
    /// Registry without any handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, class: impl Into<String>, handler: FieldHandler) {
        self.handlers.insert(class.into(), handler);
    }

    pub fn get(&self, class: &str) -> Option<FieldHandler> {
        self.handlers.get(class).copied()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for class in ["solr.DateField", "solr.TrieDateField", "solr.DatePointField"] {
            registry.register(class, date_handler);
        }
        for class in ["solr.IntField", "solr.TrieIntField", "solr.IntPointField"] {
            registry.register(class, int_handler);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_handler_rejects_missing_values() {
        assert_eq!(int_handler(AttributeValue::Null), Err(HandlerError::MissingValue));
        assert_eq!(int_handler(AttributeValue::text("")), Err(HandlerError::MissingValue));
    }

    #[test]
    fn test_int_handler_passes_values_through() {
        assert_eq!(int_handler(AttributeValue::Int(0)), Ok(json!(0)));
        assert_eq!(int_handler(AttributeValue::text("42")), Ok(json!("42")));
    }

    #[test]
    fn test_default_registry() {
        let registry = HandlerRegistry::default();
        assert!(registry.get("solr.TrieDateField").is_some());
        assert!(registry.get("solr.IntField").is_some());
        assert!(registry.get("solr.TextField").is_none());
    }
}
