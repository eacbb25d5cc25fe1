//! # Solr Indexer
//!
//! Main library for the Solr indexing integration.
//!
//! This crate provides the configuration, dependency wiring and tracing
//! setup for running the queue processor against a Solr core.

pub mod config;
pub mod telemetry;

pub use config::{Dependencies, SolrIndexerConfig};
pub use telemetry::init_tracing;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The tracing subscriber could not be installed.
    #[error("Tracing error: {0}")]
    TracingError(String),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a tracing error.
    pub fn tracing(msg: impl Into<String>) -> Self {
        Self::TracingError(msg.into())
    }
}
