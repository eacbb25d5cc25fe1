//! Document extractor.
//!
//! Turns a content object into a schema-conformant document. One bad field
//! never aborts the extraction; only persistence conflicts propagate.

mod prepare;

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::content::{AttributeError, ContentObject, IndexableView, IndexerRegistry};
use crate::errors::ConflictError;
use crate::handlers::{HandlerError, HandlerRegistry};
use solr_indexer_shared::{Document, Schema};

pub use prepare::prepare_data;

/// Result of extracting one object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Wire-ready field values.
    pub document: Document,
    /// Required schema fields absent from `document`.
    pub missing: BTreeSet<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// Extracts documents using field type handlers and computed attributes.
#[derive(Clone, Default)]
pub struct DocumentExtractor {
    handlers: HandlerRegistry,
    indexers: IndexerRegistry,
}

impl DocumentExtractor {
    pub fn new(handlers: HandlerRegistry, indexers: IndexerRegistry) -> Self {
        Self { handlers, indexers }
    }

    pub fn indexers(&self) -> &IndexerRegistry {
        &self.indexers
    }

    /// Extract a document from `object`.
    ///
    /// # Arguments
    ///
    /// * `object` - The raw content object; it is decorated before reading
    /// * `schema` - The cached schema, `None` if it could not be fetched
    /// * `attributes` - Field names to read; all schema fields when `None`
    ///
    /// # Returns
    ///
    /// * `Ok(Extraction)` - The document and the required fields it lacks
    /// * `Err(ConflictError)` - If reading an attribute hit a persistence conflict
    pub fn extract(
        &self,
        object: &dyn ContentObject,
        schema: Option<&Schema>,
        attributes: Option<&[String]>,
    ) -> Result<Extraction, ConflictError> {
        let Some(schema) = schema else {
            return Ok(Extraction::default());
        };

        let names: Vec<&str> = match attributes {
            Some(attributes) => attributes.iter().map(String::as_str).collect(),
            None => schema.field_names().collect(),
        };

        let view = IndexableView::new(object, &self.indexers);
        let mut document = Document::new();

        for name in names {
            let Some(field) = schema.field(name) else {
                continue;
            };

            let raw = match view.get(name) {
                Ok(Some(raw)) => raw,
                Ok(None) | Err(AttributeError::Missing) => continue,
                Err(AttributeError::Conflict(conflict)) => return Err(conflict),
                Err(AttributeError::Failed(reason)) => {
                    error!(
                        path = %object.path(),
                        field = %name,
                        error = %reason,
                        "Error occurred while getting data for indexing"
                    );
                    continue;
                }
            };

            let value = match self.handlers.get(&field.class) {
                Some(handler) => match handler(raw) {
                    Ok(value) => value,
                    Err(HandlerError::MissingValue) => continue,
                    Err(HandlerError::Malformed(reason)) => {
                        warn!(
                            path = %object.path(),
                            field = %name,
                            error = %reason,
                            "Skipping field with malformed value"
                        );
                        continue;
                    }
                },
                None if raw.is_sequence() && !field.multi_valued => {
                    Value::String(raw.join(&field.separator))
                }
                None => raw.into_wire(),
            };

            document.insert(name.to_string(), value);
        }

        let missing: BTreeSet<String> = schema
            .required_fields
            .iter()
            .filter(|name| !document.contains_key(name.as_str()))
            .cloned()
            .collect();

        debug!(
            path = %object.path(),
            fields = document.len(),
            missing = missing.len(),
            "Extracted document"
        );

        Ok(Extraction { document, missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_schema, TestObject};
    use chrono::DateTime;
    use serde_json::json;
    use solr_indexer_shared::AttributeValue;

    fn extract(object: &TestObject) -> Extraction {
        let schema = test_schema();
        DocumentExtractor::default()
            .extract(object, Some(&schema), None)
            .unwrap()
    }

    #[test]
    fn test_extracts_schema_fields_only() {
        let object = TestObject::document("/plone/doc", "abc")
            .with("Title", AttributeValue::text("Hello"))
            .with("not_in_schema", AttributeValue::text("ignored"));

        let extraction = extract(&object);

        assert_eq!(extraction.document.get("UID"), Some(&json!("abc")));
        assert_eq!(extraction.document.get("Title"), Some(&json!("Hello")));
        assert_eq!(extraction.document.get("path_string"), Some(&json!("/plone/doc")));
        assert!(!extraction.document.contains_key("not_in_schema"));
        assert!(extraction.missing.is_empty());
    }

    #[test]
    fn test_missing_unique_key_is_reported() {
        let object = TestObject::new("/plone/doc").with("Title", AttributeValue::text("Hello"));

        let extraction = extract(&object);

        assert!(extraction.missing.contains("UID"));
        assert!(!extraction.is_empty());
    }

    #[test]
    fn test_sequences_are_joined_for_single_valued_fields() {
        let object = TestObject::document("/plone/doc", "abc")
            .with("Keywords", AttributeValue::from(vec!["a", "b"]))
            .with("Subject", AttributeValue::from(vec!["x", "y"]))
            .with("Title", AttributeValue::from(vec!["one", "two"]));

        let extraction = extract(&object);

        assert_eq!(extraction.document.get("Keywords"), Some(&json!("a, b")));
        assert_eq!(extraction.document.get("Subject"), Some(&json!(["x", "y"])));
        assert_eq!(extraction.document.get("Title"), Some(&json!("one two")));
    }

    #[test]
    fn test_handlers_are_applied() {
        let created = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+02:00").unwrap();
        let object = TestObject::document("/plone/doc", "abc")
            .with("created", AttributeValue::Timestamp(created))
            .with("getObjPositionInParent", AttributeValue::Int(0));

        let extraction = extract(&object);

        assert_eq!(extraction.document.get("created"), Some(&json!("2024-03-01T08:00:00.000Z")));
        assert_eq!(extraction.document.get("getObjPositionInParent"), Some(&json!(0)));
    }

    #[test]
    fn test_handler_rejections_skip_the_field() {
        let object = TestObject::document("/plone/doc", "abc")
            .with("created", AttributeValue::Null)
            .with("getObjPositionInParent", AttributeValue::text(""))
            .with("Title", AttributeValue::text("kept"));

        let extraction = extract(&object);

        assert!(!extraction.document.contains_key("created"));
        assert!(!extraction.document.contains_key("getObjPositionInParent"));
        assert_eq!(extraction.document.get("Title"), Some(&json!("kept")));
    }

    #[test]
    fn test_failing_attribute_is_skipped() {
        let object = TestObject::document("/plone/doc", "abc")
            .with_error("Title", AttributeError::failed("boom"))
            .with_callable("SearchableText", || Err(AttributeError::Missing));

        let extraction = extract(&object);

        assert!(!extraction.document.contains_key("Title"));
        assert!(!extraction.document.contains_key("SearchableText"));
        assert_eq!(extraction.document.get("UID"), Some(&json!("abc")));
    }

    #[test]
    fn test_conflict_propagates() {
        let object = TestObject::document("/plone/doc", "abc").with_conflict("Title");
        let schema = test_schema();

        let result = DocumentExtractor::default().extract(&object, Some(&schema), None);

        assert_eq!(result, Err(ConflictError::new("write conflict")));
    }

    #[test]
    fn test_undecodable_bytes_are_dropped() {
        let object = TestObject::document("/plone/doc", "abc")
            .with("Title", AttributeValue::Bytes(b"Gr\xc3\xbc\xffe".to_vec()));

        let extraction = extract(&object);

        assert_eq!(extraction.document.get("Title"), Some(&json!("Grüe")));
    }

    #[test]
    fn test_requested_attributes_only() {
        let object = TestObject::document("/plone/doc", "abc")
            .with("Title", AttributeValue::text("Hello"));
        let schema = test_schema();
        let attributes = vec!["UID".to_string(), "irrelevant".to_string()];

        let extraction = DocumentExtractor::default()
            .extract(&object, Some(&schema), Some(&attributes))
            .unwrap();

        assert_eq!(extraction.document.len(), 1);
        assert_eq!(extraction.document.get("UID"), Some(&json!("abc")));
    }

    #[test]
    fn test_no_schema_yields_empty_extraction() {
        let object = TestObject::document("/plone/doc", "abc");

        let extraction = DocumentExtractor::default().extract(&object, None, None).unwrap();

        assert!(extraction.is_empty());
        assert!(extraction.missing.is_empty());
        assert_eq!(object.reads.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
