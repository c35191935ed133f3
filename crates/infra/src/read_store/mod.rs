//! Denormalized read store: one document per sku, no joins.

pub mod in_memory;

pub use in_memory::InMemoryReadStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockline_core::CategoryId;
use stockline_inventory::{Product, ProductCategory, Sku};

/// Category fields embedded in every document so list queries never join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub id: CategoryId,
    pub name: String,
}

/// The denormalized projection of one product, keyed by sku.
///
/// A fixed schema rather than an open map: projection drift against the
/// write model is a compile error here, not a runtime surprise. Documents
/// are only ever written whole by the projector; a missing document for a
/// known sku means unsynced drift, not deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadDocument {
    pub sku: Sku,
    pub name: String,
    pub description: String,
    pub category: CategorySnapshot,
    pub unit_price: f64,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub supplier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReadDocument {
    /// Build the full document from just-committed write-model state.
    pub fn denormalize(product: &Product, category: &ProductCategory) -> Self {
        Self {
            sku: product.sku().clone(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            category: CategorySnapshot {
                id: category.id_typed(),
                name: category.name().to_string(),
            },
            unit_price: product.unit_price().as_major_units(),
            stock_quantity: product.stock_quantity(),
            min_stock_level: product.min_stock_level(),
            supplier: product.supplier().to_string(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }

    /// The low-stock predicate: a comparison between two fields of the same
    /// document, answerable without any cross-document lookup.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < self.min_stock_level
    }
}

/// Sort key for `find_all` scans. Name is the production ordering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Sku,
    UpdatedAt,
}

/// Predicate for `count`: whole collection, or documents below their own
/// minimum stock level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DocumentFilter {
    All,
    LowStock,
}

/// Read store operation error. All variants are infrastructure conditions;
/// there are no domain failures on this side.
#[derive(Debug, Error)]
pub enum ReadStoreError {
    #[error("read store unavailable: {0}")]
    Unavailable(String),

    #[error("read store timed out: {0}")]
    Timeout(String),

    #[error("read store backend error: {0}")]
    Backend(String),
}

/// Document store for the read side.
///
/// Written only by the sync path (projector + reconciliation), never by
/// clients. Every supported query is a single-collection scan or filter.
/// Implementations must time-bound every call; a hung backend surfaces as
/// [`ReadStoreError::Timeout`].
pub trait ReadStore: Send + Sync {
    /// Reachability probe. Reconciliation treats a failure here as fatal.
    fn ping(&self) -> Result<(), ReadStoreError>;

    /// Replace-if-exists / insert-if-absent, keyed by sku. Always writes the
    /// complete document, which is what makes re-application idempotent.
    fn upsert(&self, document: ReadDocument) -> Result<(), ReadStoreError>;

    fn get(&self, sku: &Sku) -> Result<Option<ReadDocument>, ReadStoreError>;

    /// Finite scan, ordered by `sort`, at most `limit` documents.
    fn find_all(&self, limit: usize, sort: SortKey) -> Result<Vec<ReadDocument>, ReadStoreError>;

    fn count(&self, filter: DocumentFilter) -> Result<u64, ReadStoreError>;
}

impl<S> ReadStore for Arc<S>
where
    S: ReadStore + ?Sized,
{
    fn ping(&self) -> Result<(), ReadStoreError> {
        (**self).ping()
    }

    fn upsert(&self, document: ReadDocument) -> Result<(), ReadStoreError> {
        (**self).upsert(document)
    }

    fn get(&self, sku: &Sku) -> Result<Option<ReadDocument>, ReadStoreError> {
        (**self).get(sku)
    }

    fn find_all(&self, limit: usize, sort: SortKey) -> Result<Vec<ReadDocument>, ReadStoreError> {
        (**self).find_all(limit, sort)
    }

    fn count(&self, filter: DocumentFilter) -> Result<u64, ReadStoreError> {
        (**self).count(filter)
    }
}
