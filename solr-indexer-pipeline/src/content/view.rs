//! Decorated view of a content object.
//!
//! Attribute resolution order: explicit object attributes, then computed
//! attributes from the `IndexerRegistry`, then workflow variables.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{AttributeError, ContentObject};
use solr_indexer_shared::AttributeValue;

/// Name of the built-in computed attribute holding the object path.
pub const PATH_STRING: &str = "path_string";

/// An attribute computed from an object rather than stored on it.
pub trait ComputedAttribute: Send + Sync {
    fn compute(&self, object: &dyn ContentObject) -> Result<Option<AttributeValue>, AttributeError>;
}

impl<F> ComputedAttribute for F
where
    F: Fn(&dyn ContentObject) -> Result<Option<AttributeValue>, AttributeError> + Send + Sync,
{
    fn compute(&self, object: &dyn ContentObject) -> Result<Option<AttributeValue>, AttributeError> {
        self(object)
    }
}

/// Computed attributes keyed by attribute name.
#[derive(Clone)]
pub struct IndexerRegistry {
    indexers: HashMap<String, Arc<dyn ComputedAttribute>>,
}

impl IndexerRegistry {
    /// Create a registry without any computed attributes.
    pub fn empty() -> Self {
        Self {
            indexers: HashMap::new(),
        }
    }

    /// Register a computed attribute, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, indexer: impl ComputedAttribute + 'static) {
        self.indexers.insert(name.into(), Arc::new(indexer));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ComputedAttribute>> {
        self.indexers.get(name)
    }
}

fn path_string(object: &dyn ContentObject) -> Result<Option<AttributeValue>, AttributeError> {
    Ok(Some(AttributeValue::Text(object.path())))
}

impl Default for IndexerRegistry {
    /// Registry with the built-in `path_string` attribute.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(PATH_STRING, path_string);
        registry
    }
}

/// A content object decorated with computed and workflow attributes.
pub struct IndexableView<'a> {
    object: &'a dyn ContentObject,
    indexers: &'a IndexerRegistry,
    workflow: BTreeMap<String, AttributeValue>,
}

impl<'a> IndexableView<'a> {
    pub fn new(object: &'a dyn ContentObject, indexers: &'a IndexerRegistry) -> Self {
        Self {
            object,
            indexers,
            workflow: object.workflow_variables(),
        }
    }

    pub fn object(&self) -> &'a dyn ContentObject {
        self.object
    }

    /// Resolve an attribute, invoking getters as needed.
    ///
    /// `Ok(None)` means no source provides the attribute.
    pub fn get(&self, name: &str) -> Result<Option<AttributeValue>, AttributeError> {
        if let Some(attribute) = self.object.attribute(name)? {
            return attribute.resolve().map(Some);
        }
        if let Some(indexer) = self.indexers.get(name) {
            if let Some(value) = indexer.compute(self.object)? {
                return Ok(Some(value));
            }
        }
        Ok(self.workflow.get(name).cloned())
    }
}
