//! Solr implementation of the search engine transport.
//!
//! This module provides concrete implementations of `SolrConnection` and
//! `ConnectionManager` using Solr's HTTP API as the backend.

mod client;
mod manager;
mod schema;
mod update;

pub use client::HttpSolrConnection;
pub use manager::SolrConnectionManager;
pub use schema::parse_schema;
pub use update::{sanitize, UpdateCommand};
