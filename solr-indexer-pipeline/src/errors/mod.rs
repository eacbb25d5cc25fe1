//! Error types for the indexing pipeline.

use std::collections::BTreeSet;

use solr_indexer_repository::SolrError;
use thiserror::Error;

/// Concurrency conflict raised by the host persistence layer.
///
/// This is the only error a queue processor verb returns: the enclosing
/// transaction has to be retried as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Conflict: {0}")]
pub struct ConflictError(pub String);

impl ConflictError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors that can occur while turning a content object into index
/// operations.
///
/// Everything except `Conflict` is absorbed by the queue processor and
/// turned into a log entry and an outcome. Handler rejections never reach
/// this level; see `HandlerError`.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The schema, or its unique key, could not be obtained.
    #[error("Schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// Required fields or the unique key are missing from the document.
    #[error("Incomplete document, missing {missing:?}")]
    IncompleteDocument { missing: BTreeSet<String> },

    /// Error from the search engine transport.
    #[error("Transport error: {0}")]
    Transport(#[from] SolrError),

    /// Persistence conflict that must propagate.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl PipelineError {
    /// Create a schema unavailable error.
    pub fn schema_unavailable(msg: impl Into<String>) -> Self {
        Self::SchemaUnavailable(msg.into())
    }

    /// Create an incomplete document error.
    pub fn incomplete(missing: impl IntoIterator<Item = String>) -> Self {
        Self::IncompleteDocument {
            missing: missing.into_iter().collect(),
        }
    }
}
