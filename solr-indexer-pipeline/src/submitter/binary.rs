//! Content extraction submitter for blob-backed objects.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::{DefaultSubmitter, DocumentSubmitter};
use crate::content::ContentObject;
use solr_indexer_repository::interfaces::FORM_CONTENT_TYPE;
use solr_indexer_repository::{AddRequest, SolrConnection, SolrError};

/// Path of the content extraction handler below the Solr base.
pub const EXTRACT_PATH: &str = "/update/extract";

/// Fields never sent as literals; Solr derives them from the binary or
/// they make no sense for it.
pub const EXCLUDED_LITERALS: &[&str] = &["SearchableText", "created", "Type", "links", "description", "Date"];

const DEFAULT_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Posts the blob path of an object to the extraction handler so Solr
/// reads the searchable text from the file itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySubmitter {
    /// Submit inline like the default submitter; used by test harnesses
    /// where Solr cannot reach the blob storage.
    inline: bool,
}

impl BinarySubmitter {
    pub fn new(inline: bool) -> Self {
        Self { inline }
    }

    /// Build the form parameters for the extraction request.
    pub fn params(&self, request: &AddRequest, blob_path: &str) -> Vec<(String, String)> {
        let mut params = Vec::new();

        for (name, value) in &request.document {
            if EXCLUDED_LITERALS.contains(&name.as_str()) {
                continue;
            }
            let key = format!("literal.{}", name);
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items.iter().filter(|item| !item.is_null()) {
                        params.push((key.clone(), literal(item)));
                    }
                }
                other => params.push((key, literal(other))),
            }
        }

        let content_type = request
            .field_str("content_type")
            .unwrap_or(DEFAULT_STREAM_CONTENT_TYPE);

        params.push(("stream.file".to_string(), blob_path.to_string()));
        params.push(("stream.contentType".to_string(), content_type.to_string()));
        params.push(("fmap.content".to_string(), "SearchableText".to_string()));
        params.push(("extractFormat".to_string(), "text".to_string()));
        if let Some(commit_within) = request.commit_within {
            params.push(("commitWithin".to_string(), commit_within.to_string()));
        }
        params
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentSubmitter for BinarySubmitter {
    async fn submit(
        &self,
        connection: &dyn SolrConnection,
        object: &dyn ContentObject,
        request: AddRequest,
    ) -> Result<(), SolrError> {
        let blob_path = match object.primary_blob_path() {
            Some(path) if !self.inline => path,
            _ => return DefaultSubmitter.submit(connection, object, request).await,
        };
        let blob_path = blob_path.to_string_lossy();

        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params(&request, &blob_path))
            .finish();
        let url = format!("{}{}", connection.solr_base(), EXTRACT_PATH);

        debug!(url = %url, blob = %blob_path, "Submitting blob for content extraction");

        let result = match connection
            .post(&url, body, &[("Content-Type", FORM_CONTENT_TYPE)])
            .await
        {
            Ok(_) => connection.flush().await.map(|_| ()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let path = request
                .field_str("path_string")
                .map(str::to_string)
                .unwrap_or_else(|| object.path());
            warn!(path = %path, error = %e, "Error submitting binary content for extraction");
            connection.reset().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockConnection, TestObject};
    use serde_json::json;
    use solr_indexer_shared::Document;

    fn request() -> AddRequest {
        let mut document = Document::new();
        for (name, value) in [
            ("UID", json!("abc")),
            ("Title", json!("Report")),
            ("Subject", json!(["a", "b"])),
            ("SearchableText", json!("text")),
            ("created", json!("2024-03-01T08:00:00.000Z")),
            ("Type", json!("File")),
            ("links", json!(["/x"])),
            ("description", json!("desc")),
            ("Date", json!("2024-03-01T08:00:00.000Z")),
            ("path_string", json!("/plone/report.pdf")),
        ] {
            document.insert(name.to_string(), value);
        }
        AddRequest::new(document).with_commit_within(Some(1000))
    }

    fn posted(calls: &[Call]) -> (String, Vec<(String, String)>) {
        match &calls[0] {
            Call::Post { url, body } => (
                url.clone(),
                form_urlencoded::parse(body.as_bytes()).into_owned().collect(),
            ),
            other => panic!("expected a post, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blob_is_posted_to_extract_handler() {
        let connection = MockConnection::new();
        let object = TestObject::document("/plone/report.pdf", "abc").with_blob("/var/blobs/1.blob");

        BinarySubmitter::new(false)
            .submit(&connection, &object, request())
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], Call::Flush);

        let (url, params) = posted(&calls);
        assert_eq!(url, "http://localhost:8983/solr/plone/update/extract");
        assert!(params.contains(&("stream.file".to_string(), "/var/blobs/1.blob".to_string())));
        assert!(params.contains(&("stream.contentType".to_string(), "application/octet-stream".to_string())));
        assert!(params.contains(&("fmap.content".to_string(), "SearchableText".to_string())));
        assert!(params.contains(&("commitWithin".to_string(), "1000".to_string())));
        assert!(params.contains(&("literal.UID".to_string(), "abc".to_string())));
        assert!(params.contains(&("literal.Subject".to_string(), "a".to_string())));
        assert!(params.contains(&("literal.Subject".to_string(), "b".to_string())));

        for excluded in EXCLUDED_LITERALS {
            let key = format!("literal.{}", excluded);
            assert!(params.iter().all(|(name, _)| name != &key), "{} was sent", key);
        }
    }

    #[tokio::test]
    async fn test_transport_error_resets_the_batch() {
        let connection = MockConnection {
            fail_posts: true,
            ..MockConnection::default()
        };
        let object = TestObject::document("/plone/report.pdf", "abc").with_blob("/var/blobs/1.blob");

        let result = BinarySubmitter::new(false)
            .submit(&connection, &object, request())
            .await;

        assert!(result.is_ok());
        let calls = connection.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], Call::Reset);
    }

    #[tokio::test]
    async fn test_inline_mode_uses_default_submission() {
        let connection = MockConnection::new();
        let object = TestObject::document("/plone/report.pdf", "abc").with_blob("/var/blobs/1.blob");

        BinarySubmitter::new(true)
            .submit(&connection, &object, request())
            .await
            .unwrap();

        let calls = connection.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Add(add) => assert!(!add.document.contains_key("links")),
            other => panic!("expected an add, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_object_without_blob_uses_default_submission() {
        let connection = MockConnection::new();
        let object = TestObject::document("/plone/report.pdf", "abc");

        BinarySubmitter::new(false)
            .submit(&connection, &object, request())
            .await
            .unwrap();

        assert!(matches!(connection.calls()[0], Call::Add(_)));
    }
}
