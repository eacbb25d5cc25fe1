//! # Solr Indexer Pipeline
//!
//! This crate provides the content side of the Solr integration: reading
//! content objects, turning them into schema-conformant documents and
//! handing those to the transport.
//!
//! ## Architecture
//!
//! 1. **Indexable**: Cheap gate deciding whether an object is indexed at all
//! 2. **Extractor**: Reads attributes through a decorated view and applies
//!    field type handlers
//! 3. **Submitter**: Sends a document inline or through content extraction
//! 4. **Processor**: The per-transaction state machine tying it together

pub mod content;
pub mod errors;
pub mod extractor;
pub mod handlers;
pub mod indexable;
pub mod processor;
pub mod submitter;

#[cfg(test)]
mod test_support;

pub use content::{Attribute, AttributeError, CatalogIntegration, ContentObject, IndexerRegistry};
pub use errors::{ConflictError, PipelineError};
pub use extractor::{DocumentExtractor, Extraction};
pub use handlers::HandlerRegistry;
pub use indexable::{CatalogAwareIndexable, IndexablePredicate};
pub use processor::{IndexOutcome, ProcessorState, QueueProcessor, UnindexOutcome};
pub use submitter::{BinarySubmitter, DefaultSubmitter, DocumentSubmitter, SubmitterRegistry};
