//! Connection manager for HTTP Solr connections.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::interfaces::{ConnectionManager, SolrConnection};
use crate::solr::client::HttpSolrConnection;
use solr_indexer_shared::Schema;

/// Lazily opens one `HttpSolrConnection` and caches the schema fetched
/// through it until the connection is closed.
pub struct SolrConnectionManager {
    config: ConnectionConfig,
    connection: Mutex<Option<Arc<HttpSolrConnection>>>,
    schema: Mutex<Option<Arc<Schema>>>,
}

impl SolrConnectionManager {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
            schema: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn connection(&self) -> Option<Arc<HttpSolrConnection>> {
        if !self.config.active {
            debug!("Solr integration is inactive");
            return None;
        }

        let mut guard = self.connection.lock().await;
        if guard.is_none() {
            match HttpSolrConnection::new(&self.config.url) {
                Ok(conn) => *guard = Some(Arc::new(conn)),
                Err(e) => {
                    warn!(url = %self.config.url, error = %e, "unable to create Solr connection");
                    return None;
                }
            }
        }
        guard.clone()
    }
}

#[async_trait]
impl ConnectionManager for SolrConnectionManager {
    async fn get_connection(&self) -> Option<Arc<dyn SolrConnection>> {
        self.connection()
            .await
            .map(|conn| conn as Arc<dyn SolrConnection>)
    }

    async fn set_index_timeout(&self) {
        if let Some(conn) = self.connection().await {
            conn.set_timeout(self.config.index_timeout).await;
        }
    }

    async fn get_schema(&self) -> Option<Arc<Schema>> {
        if let Some(schema) = self.schema.lock().await.as_ref() {
            return Some(schema.clone());
        }

        let conn = self.connection().await?;
        match conn.get_schema().await {
            Ok(schema) => {
                info!(
                    fields = schema.fields.len(),
                    unique_key = ?schema.unique_key,
                    "Fetched Solr schema"
                );
                let schema = Arc::new(schema);
                *self.schema.lock().await = Some(schema.clone());
                Some(schema)
            }
            Err(e) => {
                warn!(error = %e, "unable to fetch schema");
                None
            }
        }
    }

    async fn close_connection(&self) {
        if let Some(conn) = self.connection.lock().await.take() {
            conn.close().await;
        }
        self.schema.lock().await.take();
    }
}
