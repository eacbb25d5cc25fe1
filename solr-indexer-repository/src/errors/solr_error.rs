//! Solr transport error types.
//!
//! This module defines the errors raised while talking to the search engine.
//! Every variant is a transport fault from the pipeline's point of view.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone)]
pub enum SolrError {
    /// Failed to establish or reuse a connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The search engine answered with a non-success status.
    #[error("HTTP code={status}, reason={reason}")]
    HttpError {
        status: u16,
        reason: String,
        body: Option<String>,
    },

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize an update command.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The request timed out.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl SolrError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, reason: impl Into<String>, body: Option<String>) -> Self {
        Self::HttpError {
            status,
            reason: reason.into(),
            body,
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}

impl From<reqwest::Error> for SolrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16(), err.to_string(), None)
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SolrError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_omits_body() {
        let err = SolrError::http(500, "Server Error", Some("<html>trace</html>".to_string()));
        assert_eq!(err.to_string(), "HTTP code=500, reason=Server Error");
    }
}
