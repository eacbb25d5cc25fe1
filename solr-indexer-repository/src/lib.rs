//! # Solr Indexer Repository
//!
//! This crate provides traits and implementations for talking to the
//! search engine. It includes definitions for errors, configuration, the
//! connection interfaces, and a concrete HTTP implementation for Solr.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod solr;
pub mod types;

pub use config::ConnectionConfig;
pub use errors::SolrError;
pub use interfaces::{ConnectionManager, SolrConnection};
pub use solr::{HttpSolrConnection, SolrConnectionManager};
pub use types::AddRequest;
