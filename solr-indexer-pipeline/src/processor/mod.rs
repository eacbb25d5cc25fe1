//! Processor module for the Solr indexer pipeline.
//!
//! Turns queued content changes into Solr update operations.

mod queue_processor;

pub use queue_processor::{IndexOutcome, ProcessorState, QueueProcessor, UnindexOutcome};
