//! Dependency initialization and wiring for the Solr indexer.

use std::sync::Arc;

use tracing::{info, warn};

use super::SolrIndexerConfig;
use crate::IndexingError;
use solr_indexer_pipeline::{QueueProcessor, SubmitterRegistry};
use solr_indexer_repository::{ConnectionManager, SolrConnectionManager};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The connection manager shared by all processors.
    pub manager: Arc<SolrConnectionManager>,
    /// The configured queue processor ready to receive events.
    pub processor: QueueProcessor,
}

impl Dependencies {
    /// Initialize all dependencies from the environment and a `.env` file.
    ///
    /// See `SolrIndexerConfig::from_env` for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration is invalid
    pub async fn new() -> Result<Self, IndexingError> {
        dotenv::dotenv().ok();
        let config = SolrIndexerConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Initialize all dependencies from explicit settings.
    pub async fn from_config(config: SolrIndexerConfig) -> Result<Self, IndexingError> {
        info!(
            solr_url = %config.url,
            active = config.active,
            binary_types = ?config.binary_types,
            "Initializing dependencies"
        );

        let connection_config = config.connection_config();
        let manager = Arc::new(SolrConnectionManager::new(connection_config.clone()));

        if config.active {
            // Solr may come up after us; the processor retries on every verb.
            match manager.get_schema().await {
                Some(schema) => info!(
                    fields = schema.fields.len(),
                    unique_key = ?schema.unique_key,
                    "Solr schema loaded"
                ),
                None => warn!(solr_url = %config.url, "Solr schema not available yet"),
            }
        }

        let submitters = SubmitterRegistry::default()
            .with_binary_types(config.binary_types.iter().cloned(), config.inline_binary);

        let processor =
            QueueProcessor::new(manager.clone(), connection_config).with_submitters(submitters);

        Ok(Self { manager, processor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solr_indexer_pipeline::ProcessorState;

    #[tokio::test]
    async fn test_inactive_config_makes_no_connection() {
        let config = SolrIndexerConfig {
            active: false,
            ..SolrIndexerConfig::default()
        };

        let dependencies = Dependencies::from_config(config).await.unwrap();

        assert!(dependencies.manager.get_connection().await.is_none());
        assert_eq!(dependencies.processor.state(), ProcessorState::Idle);
        assert!(!dependencies.processor.config().active);
    }
}
