//! Connection manager trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::interfaces::SolrConnection;
use solr_indexer_shared::Schema;

/// Hands out the connection and the cached schema for the current
/// transaction.
///
/// Implementations are injected into the queue processor so the transport
/// can be swapped for a mock in tests. Retry policy, if any, lives here and
/// not in the pipeline.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Get the open connection, creating it if necessary.
    ///
    /// Returns `None` when the integration is inactive or the connection
    /// cannot be created.
    async fn get_connection(&self) -> Option<Arc<dyn SolrConnection>>;

    /// Apply the indexing timeout to the connection, opening it if necessary.
    async fn set_index_timeout(&self);

    /// Get the index schema, fetching it on first use.
    ///
    /// Returns `None` when the schema cannot be fetched.
    async fn get_schema(&self) -> Option<Arc<Schema>>;

    /// Close the connection and discard the cached schema.
    async fn close_connection(&self);
}
