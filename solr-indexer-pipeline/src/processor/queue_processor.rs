//! Queue processor implementation.
//!
//! Receives index, reindex and unindex events for content objects within
//! one host transaction and turns them into Solr update operations. Only
//! persistence conflicts escape the verbs; every other fault is logged and
//! reported through the returned outcome.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::content::ContentObject;
use crate::errors::{ConflictError, PipelineError};
use crate::extractor::{prepare_data, DocumentExtractor};
use crate::indexable::{CatalogAwareIndexable, IndexablePredicate};
use crate::submitter::{SubmitterRegistry, DEFAULT_SUBMITTER};
use solr_indexer_repository::{AddRequest, ConnectionConfig, ConnectionManager, SolrConnection};
use solr_indexer_shared::Schema;

const PORTAL_TYPE: &str = "portal_type";

/// Where the processor is within the current transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorState {
    #[default]
    Idle,
    /// Updates were handed to the connection and await commit or abort.
    PendingCommit,
}

/// What `index` and `reindex` did with an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The object does not take part in indexing.
    NotIndexable,
    /// The integration is switched off or no connection could be made.
    Inactive,
    /// The schema or its unique key could not be obtained.
    SchemaUnavailable,
    /// None of the changed attributes is a schema field.
    NothingRelevant,
    /// Extraction produced no fields.
    EmptyDocument,
    /// Required fields or the unique key are missing.
    Incomplete { missing: BTreeSet<String> },
    /// The document was handed to its submitter.
    Submitted,
    /// The transport rejected the document.
    Failed,
}

/// What `unindex` did with an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnindexOutcome {
    Inactive,
    SchemaUnavailable,
    /// The object has no unique key value to delete by.
    MissingKey,
    Deleted,
    Failed,
}

/// The open connection together with the schema it serves.
struct Session {
    connection: Arc<dyn SolrConnection>,
    schema: Arc<Schema>,
    unique_key: String,
}

/// Queue processor feeding content changes to Solr.
///
/// One instance serves one transaction at a time; the connection it
/// obtains from the manager holds the transaction's implicit batch.
pub struct QueueProcessor {
    manager: Arc<dyn ConnectionManager>,
    config: ConnectionConfig,
    predicate: Arc<dyn IndexablePredicate>,
    extractor: DocumentExtractor,
    submitters: SubmitterRegistry,
    state: ProcessorState,
}

impl QueueProcessor {
    /// Create a new queue processor.
    ///
    /// # Arguments
    ///
    /// * `manager` - Hands out the connection and the cached schema
    /// * `config` - Commit behaviour of the connection
    pub fn new(manager: Arc<dyn ConnectionManager>, config: ConnectionConfig) -> Self {
        Self {
            manager,
            config,
            predicate: Arc::new(CatalogAwareIndexable),
            extractor: DocumentExtractor::default(),
            submitters: SubmitterRegistry::default(),
            state: ProcessorState::Idle,
        }
    }

    pub fn with_predicate(mut self, predicate: Arc<dyn IndexablePredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_extractor(mut self, extractor: DocumentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_submitters(mut self, submitters: SubmitterRegistry) -> Self {
        self.submitters = submitters;
        self
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Batches are implicit; nothing to do.
    pub fn begin(&mut self) {}

    /// Index an object.
    ///
    /// # Arguments
    ///
    /// * `object` - The raw content object
    /// * `attributes` - Names of the changed attributes, or `None` for all
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome)` - What happened to the object
    /// * `Err(ConflictError)` - If reading the object hit a persistence
    ///   conflict; the transaction must be retried
    #[instrument(skip(self, object, attributes), fields(path = %object.path()))]
    pub async fn index(
        &mut self,
        object: &dyn ContentObject,
        attributes: Option<&[String]>,
    ) -> Result<IndexOutcome, ConflictError> {
        match self.index_object(object, attributes).await {
            Ok(outcome) => Ok(outcome),
            Err(PipelineError::Conflict(conflict)) => Err(conflict),
            Err(PipelineError::SchemaUnavailable(reason)) => {
                warn!(path = %object.path(), reason = %reason, "Skipping indexing");
                Ok(IndexOutcome::SchemaUnavailable)
            }
            Err(PipelineError::IncompleteDocument { missing }) => {
                debug!(path = %object.path(), missing = ?missing, "Not indexing incomplete document");
                Ok(IndexOutcome::Incomplete { missing })
            }
            Err(PipelineError::Transport(e)) => {
                error!(path = %object.path(), error = %e, "Exception during indexing");
                Ok(IndexOutcome::Failed)
            }
        }
    }

    /// Reindex an object; Solr has no partial updates, so this is `index`.
    pub async fn reindex(
        &mut self,
        object: &dyn ContentObject,
        attributes: Option<&[String]>,
    ) -> Result<IndexOutcome, ConflictError> {
        self.index(object, attributes).await
    }

    /// Remove an object from the index by its unique key.
    #[instrument(skip(self, object), fields(path = %object.path()))]
    pub async fn unindex(&mut self, object: &dyn ContentObject) -> Result<UnindexOutcome, ConflictError> {
        match self.unindex_object(object).await {
            Ok(outcome) => Ok(outcome),
            Err(PipelineError::Conflict(conflict)) => Err(conflict),
            Err(PipelineError::SchemaUnavailable(reason)) => {
                warn!(path = %object.path(), reason = %reason, "Skipping unindexing");
                Ok(UnindexOutcome::SchemaUnavailable)
            }
            Err(PipelineError::IncompleteDocument { .. }) => {
                info!(path = %object.path(), "Can not unindex: no unique key for object");
                Ok(UnindexOutcome::MissingKey)
            }
            Err(PipelineError::Transport(e)) => {
                error!(path = %object.path(), error = %e, "Exception during unindexing");
                Ok(UnindexOutcome::Failed)
            }
        }
    }

    /// Make the pending batch durable and release the connection.
    ///
    /// With a commit-within window or auto-commit disabled the batch is only
    /// flushed and Solr decides when to commit. `wait` defaults to the
    /// inverse of the configured async flag.
    #[instrument(skip(self))]
    pub async fn commit(&mut self, wait: Option<bool>) {
        if let Some(connection) = self.manager.get_connection().await {
            let wait = wait.unwrap_or(!self.config.async_commit);
            let result = if self.config.commit_within_ms().is_some() || !self.config.auto_commit {
                debug!("Flushing");
                connection.flush().await.map(|_| ())
            } else {
                debug!(wait, "Committing");
                connection.commit(wait, wait).await
            };
            if let Err(e) = result {
                error!(error = %e, "Exception during commit");
            }
            self.manager.close_connection().await;
        }
        self.state = ProcessorState::Idle;
    }

    /// Roll back the pending batch and release the connection.
    #[instrument(skip(self))]
    pub async fn abort(&mut self) {
        if let Some(connection) = self.manager.get_connection().await {
            debug!("Aborting");
            if let Err(e) = connection.abort().await {
                error!(error = %e, "Exception during abort");
            }
            self.manager.close_connection().await;
        }
        self.state = ProcessorState::Idle;
    }

    async fn index_object(
        &mut self,
        object: &dyn ContentObject,
        attributes: Option<&[String]>,
    ) -> Result<IndexOutcome, PipelineError> {
        if !self.predicate.is_indexable(object) {
            return Ok(IndexOutcome::NotIndexable);
        }
        let Some(session) = self.session().await? else {
            return Ok(IndexOutcome::Inactive);
        };

        // Solr needs every field on an add, so a relevant change still
        // extracts the whole document.
        if let Some(attributes) = attributes {
            if session.schema.relevant(attributes.iter().map(String::as_str)).is_empty() {
                return Ok(IndexOutcome::NothingRelevant);
            }
        }

        let extraction = self.extractor.extract(object, Some(session.schema.as_ref()), None)?;
        if extraction.is_empty() {
            return Ok(IndexOutcome::EmptyDocument);
        }
        let mut document = extraction.document;
        prepare_data(&mut document);

        let mut missing = extraction.missing;
        if is_absent(document.get(&session.unique_key)) {
            missing.insert(session.unique_key.clone());
        }
        if !missing.is_empty() {
            return Err(PipelineError::incomplete(missing));
        }

        let content_type = document
            .get(PORTAL_TYPE)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SUBMITTER)
            .to_string();
        let request = AddRequest::new(document).with_commit_within(self.config.commit_within_ms());

        debug!(path = %object.path(), content_type = %content_type, "Indexing");
        self.state = ProcessorState::PendingCommit;
        self.submitters
            .resolve(&content_type)
            .submit(session.connection.as_ref(), object, request)
            .await?;
        Ok(IndexOutcome::Submitted)
    }

    async fn unindex_object(&mut self, object: &dyn ContentObject) -> Result<UnindexOutcome, PipelineError> {
        let Some(session) = self.session().await? else {
            return Ok(UnindexOutcome::Inactive);
        };

        // The unique key belongs to the object itself, not to a wrapper.
        let object = object.wrapped().unwrap_or(object);
        let attributes = [session.unique_key.clone()];
        let mut document = self
            .extractor
            .extract(object, Some(session.schema.as_ref()), Some(&attributes))?
            .document;
        prepare_data(&mut document);

        let id = match document.get(&session.unique_key) {
            Some(Value::String(id)) => id.clone(),
            Some(value) if !value.is_null() => value.to_string(),
            _ => return Err(PipelineError::incomplete([session.unique_key.clone()])),
        };

        debug!(path = %object.path(), id = %id, "Unindexing");
        self.state = ProcessorState::PendingCommit;
        session.connection.delete(&id).await?;
        Ok(UnindexOutcome::Deleted)
    }

    /// Obtain the connection, schema and unique key for one verb.
    ///
    /// Returns `Ok(None)` when there is no connection to work with.
    async fn session(&self) -> Result<Option<Session>, PipelineError> {
        self.manager.set_index_timeout().await;
        let Some(connection) = self.manager.get_connection().await else {
            debug!("No Solr connection available");
            return Ok(None);
        };
        let schema = self
            .manager
            .get_schema()
            .await
            .ok_or_else(|| PipelineError::schema_unavailable("unable to fetch schema"))?;
        let unique_key = schema
            .unique_key
            .clone()
            .ok_or_else(|| PipelineError::schema_unavailable("schema is missing unique key"))?;
        Ok(Some(Session {
            connection,
            schema,
            unique_key,
        }))
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}
