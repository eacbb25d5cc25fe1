//! Environment-driven settings for the Solr indexer.

use std::env;
use std::time::Duration;

use crate::IndexingError;
use solr_indexer_repository::config::DEFAULT_SOLR_URL;
use solr_indexer_repository::ConnectionConfig;

/// Content types submitted through content extraction by default.
const DEFAULT_BINARY_TYPES: &[&str] = &["File", "Image"];

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct SolrIndexerConfig {
    pub url: String,
    pub active: bool,
    pub commit_within: Option<Duration>,
    pub auto_commit: bool,
    pub async_commit: bool,
    pub index_timeout: Option<Duration>,
    /// Content types whose blobs Solr extracts itself.
    pub binary_types: Vec<String>,
    /// Submit binary content inline; for harnesses without shared blob storage.
    pub inline_binary: bool,
}

impl Default for SolrIndexerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOLR_URL.to_string(),
            active: true,
            commit_within: None,
            auto_commit: true,
            async_commit: false,
            index_timeout: None,
            binary_types: DEFAULT_BINARY_TYPES.iter().map(|t| t.to_string()).collect(),
            inline_binary: false,
        }
    }
}

impl SolrIndexerConfig {
    /// Load settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SOLR_URL`: Solr core URL (default: http://localhost:8983/solr)
    /// - `SOLR_ACTIVE`: Enable the integration (default: true)
    /// - `SOLR_COMMIT_WITHIN_MS`: Commit-within window in milliseconds
    /// - `SOLR_AUTO_COMMIT`: Issue hard commits (default: true)
    /// - `SOLR_ASYNC`: Do not wait for Solr on commit (default: false)
    /// - `SOLR_INDEX_TIMEOUT_SECS`: Request timeout while indexing
    /// - `SOLR_BINARY_TYPES`: Comma separated content types (default: File,Image)
    /// - `SOLR_INLINE_BINARY`: Submit binary content inline (default: false)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let binary_types = match var("SOLR_BINARY_TYPES") {
            Some(types) => types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.binary_types,
        };

        Ok(Self {
            url: var("SOLR_URL").unwrap_or(defaults.url),
            active: parse_bool("SOLR_ACTIVE", var("SOLR_ACTIVE"), defaults.active)?,
            commit_within: parse_u64("SOLR_COMMIT_WITHIN_MS", var("SOLR_COMMIT_WITHIN_MS"))?
                .map(Duration::from_millis),
            auto_commit: parse_bool("SOLR_AUTO_COMMIT", var("SOLR_AUTO_COMMIT"), defaults.auto_commit)?,
            async_commit: parse_bool("SOLR_ASYNC", var("SOLR_ASYNC"), defaults.async_commit)?,
            index_timeout: parse_u64("SOLR_INDEX_TIMEOUT_SECS", var("SOLR_INDEX_TIMEOUT_SECS"))?
                .map(Duration::from_secs),
            binary_types,
            inline_binary: parse_bool("SOLR_INLINE_BINARY", var("SOLR_INLINE_BINARY"), defaults.inline_binary)?,
        })
    }

    /// Connection settings for the transport layer.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.url.clone(),
            active: self.active,
            commit_within: self.commit_within,
            auto_commit: self.auto_commit,
            async_commit: self.async_commit,
            index_timeout: self.index_timeout,
        }
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, IndexingError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(IndexingError::config(format!("{} must be a boolean, got {:?}", key, other))),
    }
}

fn parse_u64(key: &str, value: Option<String>) -> Result<Option<u64>, IndexingError> {
    value
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| IndexingError::config(format!("{} must be a number: {}", key, e)))
        })
        .transpose()
}
