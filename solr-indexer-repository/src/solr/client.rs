//! HTTP Solr connection implementation.
//!
//! This module provides the concrete implementation of `SolrConnection`
//! talking to Solr's HTTP API with `reqwest`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SolrError;
use crate::interfaces::{Headers, SolrConnection, JSON_CONTENT_TYPE};
use crate::solr::schema::{parse_schema, SCHEMA_PATH};
use crate::solr::update::UpdateCommand;
use crate::types::AddRequest;
use solr_indexer_shared::Schema;

/// Retries of a POST after a socket-level failure.
const POST_RETRIES: usize = 1;

/// Solr connection over HTTP.
///
/// Update commands are queued in memory and only sent on `flush` or
/// `commit`, so `abort` can drop a batch Solr has never seen.
///
/// # Example
///
/// ```ignore
/// let conn = HttpSolrConnection::new("http://localhost:8983/solr/plone")?;
/// conn.add(&AddRequest::new(document)).await?;
/// conn.commit(true, true).await?;
/// ```
pub struct HttpSolrConnection {
    client: Client,
    solr_base: String,
    pending: Mutex<Vec<UpdateCommand>>,
    timeout: Mutex<Option<Duration>>,
    reconnects: AtomicUsize,
}

impl HttpSolrConnection {
    /// Create a new connection for the Solr core at `url`.
    ///
    /// No request is made until the first flush or schema fetch.
    ///
    /// # Returns
    ///
    /// * `Ok(HttpSolrConnection)` - A new connection
    /// * `Err(SolrError)` - If the URL is invalid or the client cannot be built
    pub fn new(url: &str) -> Result<Self, SolrError> {
        let parsed = Url::parse(url).map_err(|e| SolrError::connection(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(SolrError::connection(format!("not a base URL: {}", url)));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| SolrError::connection(e.to_string()))?;

        let solr_base = parsed.as_str().trim_end_matches('/').to_string();
        info!(solr_base = %solr_base, "Created Solr connection");

        Ok(Self {
            client,
            solr_base,
            pending: Mutex::new(Vec::new()),
            timeout: Mutex::new(None),
            reconnects: AtomicUsize::new(0),
        })
    }

    /// Number of times the connection has been reset.
    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// Timeout currently applied to requests.
    pub async fn timeout(&self) -> Option<Duration> {
        *self.timeout.lock().await
    }

    /// Number of commands waiting for the next flush.
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn queue(&self, command: UpdateCommand) {
        debug!(kind = command.kind(), "storing update command for later");
        self.pending.lock().await.push(command);
    }

    fn header_map(headers: Headers<'_>) -> Result<HeaderMap, SolrError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SolrError::connection(e.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| SolrError::connection(e.to_string()))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Send one update command and check Solr's own status in the response.
    async fn send_command(&self, command: &UpdateCommand) -> Result<(), SolrError> {
        let body = serde_json::to_string(&command.to_json())
            .map_err(|e| SolrError::serialization(e.to_string()))?;
        let url = format!("{}/update?wt=json", self.solr_base);
        let response = self
            .post(&url, body, &[(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)])
            .await?;
        check_response_status(&response)
    }
}

/// Solr can answer 200 with a non-zero status in the response header.
fn check_response_status(body: &str) -> Result<(), SolrError> {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Ok(()),
    };
    let status = parsed
        .pointer("/responseHeader/status")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if status != 0 {
        let reason = parsed
            .pointer("/error/msg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(SolrError::http(200, reason, Some(body.to_string())));
    }
    Ok(())
}

#[async_trait]
impl SolrConnection for HttpSolrConnection {
    fn solr_base(&self) -> &str {
        &self.solr_base
    }

    async fn add(&self, request: &AddRequest) -> Result<(), SolrError> {
        self.queue(UpdateCommand::add(request)).await;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SolrError> {
        self.queue(UpdateCommand::delete(id)).await;
        Ok(())
    }

    async fn commit(&self, wait_flush: bool, wait_searcher: bool) -> Result<(), SolrError> {
        self.queue(UpdateCommand::commit(wait_flush, wait_searcher))
            .await;
        self.flush().await.map(|_| ())
    }

    /// Send out the stored commands.
    ///
    /// A failing command is logged and the remaining ones are still sent.
    #[instrument(skip(self))]
    async fn flush(&self) -> Result<usize, SolrError> {
        let commands: Vec<UpdateCommand> = self.pending.lock().await.drain(..).collect();
        let total = commands.len();
        let mut sent = 0;

        for command in &commands {
            match self.send_command(command).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    error!(kind = command.kind(), error = %e, "exception during update request");
                }
            }
        }

        debug!(sent = sent, total = total, "flushed update commands");
        Ok(sent)
    }

    async fn abort(&self) -> Result<(), SolrError> {
        let mut pending = self.pending.lock().await;
        debug!(count = pending.len(), "aborting pending update commands");
        pending.clear();
        Ok(())
    }

    async fn reset(&self) {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        let mut pending = self.pending.lock().await;
        debug!(
            count = pending.len(),
            reconnects = self.reconnects(),
            "resetting connection"
        );
        pending.clear();
    }

    /// Socket-level failures are retried once after a reconnect.
    async fn post(&self, url: &str, body: String, headers: Headers<'_>) -> Result<String, SolrError> {
        let headers = Self::header_map(headers)?;
        let timeout = *self.timeout.lock().await;

        let mut attempt = 0;
        let response = loop {
            let mut request = self.client.post(url).headers(headers.clone()).body(body.clone());
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }
            match request.send().await {
                Ok(response) => break response,
                Err(e) if attempt < POST_RETRIES && (e.is_connect() || e.is_request()) => {
                    attempt += 1;
                    let reconnects = self.reconnects.fetch_add(1, Ordering::SeqCst) + 1;
                    warn!(url = %url, error = %e, reconnects, "Solr request failed, reconnecting");
                }
                Err(e) => return Err(e.into()),
            }
        };

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(status = %status, url = %url, "Solr request failed");
            return Err(SolrError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
                Some(text),
            ));
        }
        Ok(text)
    }

    #[instrument(skip(self), fields(solr_base = %self.solr_base))]
    async fn get_schema(&self) -> Result<Schema, SolrError> {
        let url = format!("{}{}", self.solr_base, SCHEMA_PATH);
        debug!(url = %url, "getting schema");

        let mut request = self.client.get(&url);
        if let Some(timeout) = *self.timeout.lock().await {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SolrError::http(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
                Some(text),
            ));
        }
        parse_schema(&text)
    }

    async fn set_timeout(&self, timeout: Option<Duration>) {
        debug!(timeout = ?timeout, "setting request timeout");
        *self.timeout.lock().await = timeout;
    }

    async fn close(&self) {
        let pending = self.pending.lock().await.len();
        if pending > 0 {
            debug!(count = pending, "closing connection with unsent commands");
        }
    }
}
