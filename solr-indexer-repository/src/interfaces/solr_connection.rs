//! Solr connection trait definition.
//!
//! This module defines the abstract interface of a connection to the search
//! engine: an implicit update batch that accumulates adds and deletes until
//! it is flushed, committed, or aborted.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SolrError;
use crate::types::AddRequest;
use solr_indexer_shared::Schema;

/// Content type for form-encoded posts such as content extraction.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Content type for JSON update commands.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// HTTP headers as name/value pairs.
pub type Headers<'a> = &'a [(&'a str, &'a str)];

/// Abstract interface for a connection to the search engine.
///
/// A connection owns one open batch. It is not meant to be shared between
/// concurrent transactions; the queue processor scopes it to one.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SolrConnection: Send + Sync {
    /// Base URL of the Solr core, without a trailing slash.
    fn solr_base(&self) -> &str;

    /// Queue a document for addition.
    ///
    /// The add is sent on the next `flush` or `commit`.
    async fn add(&self, request: &AddRequest) -> Result<(), SolrError>;

    /// Queue a delete-by-id.
    async fn delete(&self, id: &str) -> Result<(), SolrError>;

    /// Queue a hard commit and send the whole batch.
    ///
    /// # Arguments
    ///
    /// * `wait_flush` - Block until the index is flushed to disk
    /// * `wait_searcher` - Block until a new searcher is opened
    async fn commit(&self, wait_flush: bool, wait_searcher: bool) -> Result<(), SolrError>;

    /// Send all queued commands without committing.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - The number of commands Solr accepted
    /// * `Err(SolrError)` - If the batch could not be sent at all
    async fn flush(&self) -> Result<usize, SolrError>;

    /// Roll back the open batch.
    async fn abort(&self) -> Result<(), SolrError>;

    /// Drop any pending batch state and start over with a fresh connection.
    async fn reset(&self);

    /// Raw POST to an arbitrary URL below the Solr base.
    ///
    /// Returns the response body on success.
    async fn post(&self, url: &str, body: String, headers: Headers<'_>) -> Result<String, SolrError>;

    /// Fetch the index schema.
    async fn get_schema(&self) -> Result<Schema, SolrError>;

    /// Set the timeout applied to subsequent requests.
    async fn set_timeout(&self, timeout: Option<Duration>);

    /// Release the connection.
    async fn close(&self);
}
