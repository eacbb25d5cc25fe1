//! Mock collaborators shared by the unit tests of this crate.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::content::{Attribute, AttributeError, CatalogIntegration, ContentObject};
use crate::errors::ConflictError;
use solr_indexer_repository::interfaces::Headers;
use solr_indexer_repository::{AddRequest, ConnectionManager, SolrConnection, SolrError};
use solr_indexer_shared::{AttributeValue, BoostValues, Document, FieldSpec, Schema};

type Getter = Arc<dyn Fn() -> Result<AttributeValue, AttributeError> + Send + Sync>;

enum Stored {
    Value(AttributeValue),
    Getter(Getter),
    Error(AttributeError),
}

/// In-memory content object.
pub struct TestObject {
    path: String,
    integrations: Vec<CatalogIntegration>,
    attributes: BTreeMap<String, Stored>,
    workflow: BTreeMap<String, AttributeValue>,
    blob_path: Option<PathBuf>,
    boosts: Option<BoostValues>,
    inner: Option<Box<TestObject>>,
    pub reads: AtomicUsize,
}

impl TestObject {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            integrations: Vec::new(),
            attributes: BTreeMap::new(),
            workflow: BTreeMap::new(),
            blob_path: None,
            boosts: None,
            inner: None,
            reads: AtomicUsize::new(0),
        }
    }

    /// Catalog-aware object carrying a UID.
    pub fn document(path: &str, uid: &str) -> Self {
        Self::new(path)
            .catalog_aware()
            .with("UID", AttributeValue::text(uid))
            .with("portal_type", AttributeValue::text("Document"))
    }

    pub fn catalog_aware(mut self) -> Self {
        self.integrations.push(CatalogIntegration::CatalogAware);
        self
    }

    pub fn catalog_multiplex(mut self) -> Self {
        self.integrations.push(CatalogIntegration::CatalogMultiplex);
        self
    }

    pub fn with(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_string(), Stored::Value(value));
        self
    }

    pub fn with_callable<F>(mut self, name: &str, getter: F) -> Self
    where
        F: Fn() -> Result<AttributeValue, AttributeError> + Send + Sync + 'static,
    {
        self.attributes
            .insert(name.to_string(), Stored::Getter(Arc::new(getter)));
        self
    }

    pub fn with_error(mut self, name: &str, error: AttributeError) -> Self {
        self.attributes.insert(name.to_string(), Stored::Error(error));
        self
    }

    pub fn with_conflict(self, name: &str) -> Self {
        self.with_error(name, AttributeError::Conflict(ConflictError::new("write conflict")))
    }

    pub fn with_workflow(mut self, name: &str, value: AttributeValue) -> Self {
        self.workflow.insert(name.to_string(), value);
        self
    }

    pub fn with_blob(mut self, path: &str) -> Self {
        self.blob_path = Some(PathBuf::from(path));
        self
    }

    pub fn with_boosts(mut self, boosts: BoostValues) -> Self {
        self.boosts = Some(boosts);
        self
    }

    pub fn wrapping(mut self, inner: TestObject) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }
}

impl ContentObject for TestObject {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn catalog_integrations(&self) -> &[CatalogIntegration] {
        &self.integrations
    }

    fn attribute(&self, name: &str) -> Result<Option<Attribute>, AttributeError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.attributes.get(name) {
            None => Ok(None),
            Some(Stored::Value(value)) => Ok(Some(Attribute::Value(value.clone()))),
            Some(Stored::Getter(getter)) => {
                let getter = getter.clone();
                Ok(Some(Attribute::callable(move || getter())))
            }
            Some(Stored::Error(error)) => Err(error.clone()),
        }
    }

    fn workflow_variables(&self) -> BTreeMap<String, AttributeValue> {
        self.workflow.clone()
    }

    fn wrapped(&self) -> Option<&dyn ContentObject> {
        self.inner.as_deref().map(|inner| inner as &dyn ContentObject)
    }

    fn primary_blob_path(&self) -> Option<PathBuf> {
        self.blob_path.clone()
    }

    fn boost_values(&self, _document: &Document) -> Option<BoostValues> {
        self.boosts.clone()
    }
}

/// A call recorded by `MockConnection`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Add(AddRequest),
    Delete(String),
    Commit { wait_flush: bool, wait_searcher: bool },
    Flush,
    Abort,
    Reset,
    Post { url: String, body: String },
    Close,
}

/// Connection that records every call instead of talking to Solr.
#[derive(Default)]
pub struct MockConnection {
    pub calls: Mutex<Vec<Call>>,
    pub fail_adds: bool,
    pub fail_deletes: bool,
    pub fail_posts: bool,
    pub fail_commits: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fault() -> SolrError {
        SolrError::http(500, "Internal Server Error", None)
    }
}

#[async_trait]
impl SolrConnection for MockConnection {
    fn solr_base(&self) -> &str {
        "http://localhost:8983/solr/plone"
    }

    async fn add(&self, request: &AddRequest) -> Result<(), SolrError> {
        if self.fail_adds {
            return Err(Self::fault());
        }
        self.record(Call::Add(request.clone()));
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SolrError> {
        if self.fail_deletes {
            return Err(SolrError::connection("connection refused"));
        }
        self.record(Call::Delete(id.to_string()));
        Ok(())
    }

    async fn commit(&self, wait_flush: bool, wait_searcher: bool) -> Result<(), SolrError> {
        self.record(Call::Commit {
            wait_flush,
            wait_searcher,
        });
        if self.fail_commits {
            return Err(Self::fault());
        }
        Ok(())
    }

    async fn flush(&self) -> Result<usize, SolrError> {
        self.record(Call::Flush);
        if self.fail_commits {
            return Err(Self::fault());
        }
        Ok(0)
    }

    async fn abort(&self) -> Result<(), SolrError> {
        self.record(Call::Abort);
        Ok(())
    }

    async fn reset(&self) {
        self.record(Call::Reset);
    }

    async fn post(&self, url: &str, body: String, _headers: Headers<'_>) -> Result<String, SolrError> {
        self.record(Call::Post {
            url: url.to_string(),
            body,
        });
        if self.fail_posts {
            return Err(Self::fault());
        }
        Ok(String::new())
    }

    async fn get_schema(&self) -> Result<Schema, SolrError> {
        Ok(test_schema())
    }

    async fn set_timeout(&self, _timeout: Option<Duration>) {}

    async fn close(&self) {
        self.record(Call::Close);
    }
}

/// Connection manager handing out one shared `MockConnection`.
pub struct MockManager {
    pub connection: Option<Arc<MockConnection>>,
    pub schema: Option<Arc<Schema>>,
    pub closed: AtomicUsize,
}

impl MockManager {
    pub fn new(connection: MockConnection) -> Self {
        Self {
            connection: Some(Arc::new(connection)),
            schema: Some(Arc::new(test_schema())),
            closed: AtomicUsize::new(0),
        }
    }

    pub fn with_schema(mut self, schema: Option<Schema>) -> Self {
        self.schema = schema.map(Arc::new);
        self
    }

    pub fn without_connection(mut self) -> Self {
        self.connection = None;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.connection
            .as_ref()
            .map(|conn| conn.calls())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConnectionManager for MockManager {
    async fn get_connection(&self) -> Option<Arc<dyn SolrConnection>> {
        self.connection
            .clone()
            .map(|conn| conn as Arc<dyn SolrConnection>)
    }

    async fn set_index_timeout(&self) {}

    async fn get_schema(&self) -> Option<Arc<Schema>> {
        self.schema.clone()
    }

    async fn close_connection(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Schema resembling a small Plone setup.
pub fn test_schema() -> Schema {
    Schema::new(Some("UID".to_string()))
        .with_field(FieldSpec::new("UID", "string", "solr.StrField").required())
        .with_field(FieldSpec::new("Title", "text", "solr.TextField"))
        .with_field(FieldSpec::new("SearchableText", "text", "solr.TextField"))
        .with_field(FieldSpec::new("Subject", "strings", "solr.StrField").multi_valued())
        .with_field(FieldSpec::new("Keywords", "string", "solr.StrField").with_separator(", "))
        .with_field(FieldSpec::new("created", "date", "solr.TrieDateField"))
        .with_field(FieldSpec::new("getObjPositionInParent", "int", "solr.TrieIntField"))
        .with_field(FieldSpec::new("portal_type", "string", "solr.StrField"))
        .with_field(FieldSpec::new("path_string", "string", "solr.StrField"))
        .with_field(FieldSpec::new("links", "string", "solr.StrField").multi_valued())
        .with_field(FieldSpec::new("allowedRolesAndUsers", "strings", "solr.StrField").multi_valued())
        .with_field(FieldSpec::new("Language", "string", "solr.StrField"))
}


/// Log lines written while a `capture_logs` guard is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route tracing output of the current thread into a buffer.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
