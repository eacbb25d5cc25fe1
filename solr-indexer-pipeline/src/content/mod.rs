//! Content object capabilities consumed by the pipeline.
//!
//! The content repository is external. Objects are seen through the
//! `ContentObject` trait; `IndexableView` decorates one with computed and
//! workflow-contributed attributes.

mod view;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::errors::ConflictError;
use solr_indexer_shared::{AttributeValue, BoostValues, Document};

pub use view::{ComputedAttribute, IndexableView, IndexerRegistry, PATH_STRING};

/// Catalog integration capability sets an object can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogIntegration {
    /// Object is indexed by several catalogs at once.
    CatalogMultiplex,
    /// Object notifies the portal catalog itself.
    CatalogAware,
}

/// Failure to read an attribute from a content object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    /// The attribute is not available on this object. Not a fault.
    #[error("attribute not available")]
    Missing,

    /// The persistence layer reported a concurrency conflict.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// Reading the attribute failed for any other reason.
    #[error("attribute read failed: {0}")]
    Failed(String),
}

impl AttributeError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

type Getter = Box<dyn Fn() -> Result<AttributeValue, AttributeError> + Send + Sync>;

/// An attribute as exposed by an object: either a plain value or a getter
/// that has to be invoked to produce it.
pub enum Attribute {
    Value(AttributeValue),
    Callable(Getter),
}

impl Attribute {
    /// Wrap a getter.
    pub fn callable<F>(getter: F) -> Self
    where
        F: Fn() -> Result<AttributeValue, AttributeError> + Send + Sync + 'static,
    {
        Self::Callable(Box::new(getter))
    }

    /// Read the value, invoking the getter if there is one.
    pub fn resolve(self) -> Result<AttributeValue, AttributeError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Callable(getter) => getter(),
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl From<AttributeValue> for Attribute {
    fn from(value: AttributeValue) -> Self {
        Self::Value(value)
    }
}

/// A content object as seen by the indexing pipeline.
///
/// Only `path` and `attribute` are mandatory; every other capability has a
/// neutral default.
pub trait ContentObject: Send + Sync {
    /// Physical path of the object in the repository, used in logs.
    fn path(&self) -> String;

    /// Catalog integration capability sets the object belongs to.
    fn catalog_integrations(&self) -> &[CatalogIntegration] {
        &[]
    }

    /// Read an explicit attribute of the object.
    ///
    /// `Ok(None)` means the object has no such attribute.
    fn attribute(&self, name: &str) -> Result<Option<Attribute>, AttributeError>;

    /// Catalog variables contributed by the workflow for this object.
    fn workflow_variables(&self) -> BTreeMap<String, AttributeValue> {
        BTreeMap::new()
    }

    /// The raw object, when this object is an adapter around another one.
    fn wrapped(&self) -> Option<&dyn ContentObject> {
        None
    }

    /// Filesystem path of the stored blob behind the object's primary
    /// field, if it holds binary content.
    fn primary_blob_path(&self) -> Option<PathBuf> {
        None
    }

    /// Boost values for the document about to be indexed.
    fn boost_values(&self, _document: &Document) -> Option<BoostValues> {
        None
    }
}

impl fmt::Debug for dyn ContentObject + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ContentObject at {}>", self.path())
    }
}
