//! Interface definitions for the search engine transport.
//!
//! This module defines the abstract `SolrConnection` and `ConnectionManager`
//! traits that allow for dependency injection and mock transports in tests.

mod connection_manager;
mod solr_connection;

pub use connection_manager::ConnectionManager;
pub use solr_connection::{Headers, SolrConnection, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
