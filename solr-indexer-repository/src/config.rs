//! Configuration types for Solr connections.

use std::time::Duration;

/// Default Solr base URL.
pub const DEFAULT_SOLR_URL: &str = "http://localhost:8983/solr";

/// Read-only connection settings, supplied by the host and consulted by the
/// connection manager and on every commit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Base URL of the Solr core, e.g. `http://localhost:8983/solr/plone`.
    pub url: String,
    /// When false the integration is switched off and no connection is made.
    pub active: bool,
    /// Ask Solr to make adds visible within this window instead of committing.
    pub commit_within: Option<Duration>,
    /// When false commits are downgraded to flushes and Solr decides when
    /// to commit.
    pub auto_commit: bool,
    /// Do not wait for flush/searcher on hard commits.
    pub async_commit: bool,
    /// Request timeout applied to the connection while indexing.
    pub index_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOLR_URL.to_string(),
            active: true,
            commit_within: None,
            auto_commit: true,
            async_commit: false,
            index_timeout: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a config pointing at the given Solr base URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the commit-within window.
    pub fn commit_within(mut self, window: Duration) -> Self {
        self.commit_within = Some(window);
        self
    }

    /// Disable explicit hard commits.
    pub fn without_auto_commit(mut self) -> Self {
        self.auto_commit = false;
        self
    }

    /// Do not wait for Solr on hard commits.
    pub fn asynchronous(mut self) -> Self {
        self.async_commit = true;
        self
    }

    /// Set the indexing request timeout.
    pub fn index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = Some(timeout);
        self
    }

    /// Switch the integration off.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Commit-within window in whole milliseconds, as Solr expects it.
    pub fn commit_within_ms(&self) -> Option<u64> {
        self.commit_within
            .map(|window| window.as_millis() as u64)
            .filter(|ms| *ms > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_within_ms() {
        let config = ConnectionConfig::default().commit_within(Duration::from_secs(2));
        assert_eq!(config.commit_within_ms(), Some(2000));

        let config = ConnectionConfig::default().commit_within(Duration::ZERO);
        assert_eq!(config.commit_within_ms(), None);
        assert_eq!(ConnectionConfig::default().commit_within_ms(), None);
    }
}
