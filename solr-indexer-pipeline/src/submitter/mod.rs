//! Document submitters.
//!
//! A submitter turns a prepared document into transport calls. The
//! variant is chosen per content type through `SubmitterRegistry`.

mod binary;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::content::ContentObject;
use solr_indexer_repository::{AddRequest, SolrConnection, SolrError};

pub use binary::{BinarySubmitter, EXCLUDED_LITERALS, EXTRACT_PATH};

/// Content type used when the document carries none.
pub const DEFAULT_SUBMITTER: &str = "default";

/// Legacy field that is never sent to the index.
const LINKS_FIELD: &str = "links";

/// Abstract interface for submitting a document to the index.
#[async_trait]
pub trait DocumentSubmitter: Send + Sync {
    /// Submit a prepared document.
    ///
    /// # Arguments
    ///
    /// * `connection` - The open connection of the current transaction
    /// * `object` - The object the document was extracted from
    /// * `request` - The document and its commit-within window
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was queued or handled
    /// * `Err(SolrError)` - If the transport rejected it
    async fn submit(
        &self,
        connection: &dyn SolrConnection,
        object: &dyn ContentObject,
        request: AddRequest,
    ) -> Result<(), SolrError>;
}

/// Adds the document with all its fields through the update batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSubmitter;

#[async_trait]
impl DocumentSubmitter for DefaultSubmitter {
    async fn submit(
        &self,
        connection: &dyn SolrConnection,
        object: &dyn ContentObject,
        mut request: AddRequest,
    ) -> Result<(), SolrError> {
        request.document.remove(LINKS_FIELD);
        let boost_values = object.boost_values(&request.document);
        connection.add(&request.with_boost_values(boost_values)).await
    }
}

/// Submitters keyed by content type, with a default fallback.
#[derive(Clone)]
pub struct SubmitterRegistry {
    default: Arc<dyn DocumentSubmitter>,
    by_type: HashMap<String, Arc<dyn DocumentSubmitter>>,
}

impl SubmitterRegistry {
    pub fn new(default: Arc<dyn DocumentSubmitter>) -> Self {
        Self {
            default,
            by_type: HashMap::new(),
        }
    }

    /// Register a submitter for one content type.
    pub fn register(&mut self, content_type: impl Into<String>, submitter: Arc<dyn DocumentSubmitter>) {
        self.by_type.insert(content_type.into(), submitter);
    }

    /// Route the given content types through content extraction.
    pub fn with_binary_types<I, S>(mut self, content_types: I, inline: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let submitter: Arc<dyn DocumentSubmitter> = Arc::new(BinarySubmitter::new(inline));
        for content_type in content_types {
            self.register(content_type, submitter.clone());
        }
        self
    }

    /// Submitter for `content_type`, falling back to the default one.
    pub fn resolve(&self, content_type: &str) -> &dyn DocumentSubmitter {
        &**self.by_type.get(content_type).unwrap_or(&self.default)
    }
}

impl Default for SubmitterRegistry {
    fn default() -> Self {
        Self::new(Arc::new(DefaultSubmitter))
    }
}
