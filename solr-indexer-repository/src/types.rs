//! Request types for Solr update operations.

use solr_indexer_shared::{BoostValues, Document};

/// Request to add (or replace) a document in the index.
///
/// Solr has no partial updates for this pipeline, so the document must carry
/// data for every field that should be searchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddRequest {
    /// Wire-ready field values.
    pub document: Document,
    /// Optional per-field and document-level boost factors.
    pub boost_values: Option<BoostValues>,
    /// Commit-within window in milliseconds.
    pub commit_within: Option<u64>,
}

impl AddRequest {
    /// Create an add request for the given document.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            boost_values: None,
            commit_within: None,
        }
    }

    /// Attach boost values.
    pub fn with_boost_values(mut self, boost_values: Option<BoostValues>) -> Self {
        self.boost_values = boost_values;
        self
    }

    /// Attach a commit-within window.
    pub fn with_commit_within(mut self, commit_within: Option<u64>) -> Self {
        self.commit_within = commit_within;
        self
    }

    /// Value of a document field rendered as a string, if present.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.document.get(name).and_then(|v| v.as_str())
    }
}
