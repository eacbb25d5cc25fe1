//! Indexability predicate.
//!
//! A cheap gate evaluated before any extraction work.

use crate::content::{CatalogIntegration, ContentObject};

/// Decides whether an object qualifies for indexing at all.
pub trait IndexablePredicate: Send + Sync {
    fn is_indexable(&self, object: &dyn ContentObject) -> bool;
}

/// Default predicate: an object is indexable when it takes part in catalog
/// integration, either as a multiplexed or as a catalog-aware object.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogAwareIndexable;

impl IndexablePredicate for CatalogAwareIndexable {
    fn is_indexable(&self, object: &dyn ContentObject) -> bool {
        object.catalog_integrations().iter().any(|integration| {
            matches!(
                integration,
                CatalogIntegration::CatalogMultiplex | CatalogIntegration::CatalogAware
            )
        })
    }
}

impl<F> IndexablePredicate for F
where
    F: Fn(&dyn ContentObject) -> bool + Send + Sync,
{
    fn is_indexable(&self, object: &dyn ContentObject) -> bool {
        self(object)
    }
}
