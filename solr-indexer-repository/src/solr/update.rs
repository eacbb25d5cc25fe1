//! Solr JSON update commands.
//!
//! Commands are queued on the connection and serialized one request body
//! each when the batch is flushed.

use serde_json::{json, Map, Value};

use crate::types::AddRequest;
use solr_indexer_shared::{BoostValues, Document, DOCUMENT_BOOST_KEY};

/// A single queued update command.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCommand {
    Add {
        document: Document,
        boost_values: Option<BoostValues>,
        commit_within: Option<u64>,
    },
    Delete {
        id: String,
    },
    Commit {
        wait_flush: bool,
        wait_searcher: bool,
    },
}

impl UpdateCommand {
    /// Build an add command from an add request.
    pub fn add(request: &AddRequest) -> Self {
        Self::Add {
            document: request.document.clone(),
            boost_values: request.boost_values.clone(),
            commit_within: request.commit_within,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self::Delete { id: id.into() }
    }

    pub fn commit(wait_flush: bool, wait_searcher: bool) -> Self {
        Self::Commit {
            wait_flush,
            wait_searcher,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Commit { .. } => "commit",
        }
    }

    /// Render the command as a Solr JSON update body.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Add {
                document,
                boost_values,
                commit_within,
            } => {
                let boosts = boost_values.as_ref();
                let mut doc = Map::new();
                for (name, value) in document {
                    if value.is_null() {
                        continue;
                    }
                    let value = sanitize_value(value);
                    let value = match boosts.and_then(|b| b.get(name)) {
                        Some(boost) => json!({ "value": value, "boost": boost }),
                        None => value,
                    };
                    doc.insert(name.clone(), value);
                }

                let mut add = Map::new();
                add.insert("doc".to_string(), Value::Object(doc));
                if let Some(boost) = boosts.and_then(|b| b.get(DOCUMENT_BOOST_KEY)) {
                    add.insert("boost".to_string(), json!(boost));
                }
                if let Some(within) = commit_within {
                    add.insert("commitWithin".to_string(), json!(within));
                }
                json!({ "add": add })
            }
            Self::Delete { id } => json!({ "delete": { "id": sanitize(id) } }),
            Self::Commit {
                wait_flush,
                wait_searcher,
            } => {
                let mut commit = Map::new();
                commit.insert("waitSearcher".to_string(), json!(wait_searcher));
                if !wait_flush && !wait_searcher {
                    commit.insert("waitFlush".to_string(), json!(false));
                }
                json!({ "commit": commit })
            }
        }
    }
}

/// Strip control characters that Solr cannot store (everything below
/// U+0020 except tab, line feed and carriage return).
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c >= ' ' || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize(s)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}
