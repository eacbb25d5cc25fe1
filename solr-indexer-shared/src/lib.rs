//! # Solr Indexer Shared
//!
//! Plain data types shared by the repository and pipeline crates: the
//! cached index schema, raw attribute values read from content objects,
//! and the wire-ready document produced by extraction.

mod document;
mod schema;
mod value;

pub use document::{BoostValues, Document, DOCUMENT_BOOST_KEY};
pub use schema::{FieldKind, FieldSpec, Schema, DEFAULT_SEPARATOR};
pub use value::AttributeValue;
