//! Authoritative transactional store for categories, products, and the ledger.

pub mod in_memory;

pub use in_memory::InMemoryWriteStore;

use std::sync::Arc;

use thiserror::Error;

use stockline_core::{CategoryId, DomainError, ProductId};
use stockline_inventory::{
    LedgerEntry, NewProduct, Product, ProductCategory, ProductUpdate, Sku, StockChange,
};

/// Write store operation error.
///
/// Domain failures (validation, uniqueness, referential protection) are
/// deterministic and surfaced unmodified; the caller must not retry them.
/// `Unavailable` and `Timeout` are infrastructure conditions, retryable with
/// backoff.
#[derive(Debug, Error)]
pub enum WriteStoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("write store unavailable: {0}")]
    Unavailable(String),

    #[error("write store timed out: {0}")]
    Timeout(String),
}

impl WriteStoreError {
    /// True for conditions worth retrying with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// One page of a bounded-memory product scan, ordered by sku.
///
/// `next_cursor` carries the last sku of the page while more products remain;
/// passing it back resumes the scan. Keyset pagination keeps the scan stable
/// under concurrent inserts, which matters because reconciliation runs
/// against live traffic.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub next_cursor: Option<Sku>,
}

/// Row of the join-shaped baseline query: product joined to its category plus
/// the ledger-entry count. This is the query the read store exists to avoid.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub product: Product,
    pub category_name: String,
    pub category_description: String,
    pub transaction_count: u64,
}

/// The authoritative relational store, the single source of truth.
///
/// Implementations must enforce the uniqueness indexes (category name,
/// product sku), the referential protections (no category delete while
/// referenced, no product delete while ledger entries exist), and the
/// per-product serialization of `apply_stock_change` (two concurrent
/// mutations of one product must never read the same previous stock).
/// All storage I/O must be time-bounded; a hung backend surfaces as
/// [`WriteStoreError::Timeout`], never as a silent hang.
pub trait WriteStore: Send + Sync {
    fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError>;

    fn category(&self, id: CategoryId) -> Result<Option<ProductCategory>, WriteStoreError>;

    fn update_category_description(
        &self,
        id: CategoryId,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError>;

    /// Fails with `ReferentialConflict` while any product references the
    /// category (protection, not cascade).
    fn delete_category(&self, id: CategoryId) -> Result<(), WriteStoreError>;

    fn create_product(&self, fields: NewProduct) -> Result<Product, WriteStoreError>;

    fn product(&self, id: ProductId) -> Result<Option<Product>, WriteStoreError>;

    fn product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, WriteStoreError>;

    fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, WriteStoreError>;

    /// Fails with `ReferentialConflict` while ledger entries reference the
    /// product.
    fn delete_product(&self, id: ProductId) -> Result<(), WriteStoreError>;

    fn product_count(&self) -> Result<u64, WriteStoreError>;

    /// Apply a stock mutation: compute the new stock level per the
    /// type-specific formula, then write the product's stock and the ledger
    /// entry as one atomic unit (both succeed or both fail). This pairing is
    /// the single transactional unit of the whole system.
    fn apply_stock_change(
        &self,
        product_id: ProductId,
        change: StockChange,
        notes: &str,
    ) -> Result<LedgerEntry, WriteStoreError>;

    /// Audit trail for one product, newest first.
    fn ledger_for(&self, product_id: ProductId) -> Result<Vec<LedgerEntry>, WriteStoreError>;

    /// Fetch one sku-ordered page of products for streaming scans.
    fn product_page(
        &self,
        cursor: Option<&Sku>,
        limit: usize,
    ) -> Result<ProductPage, WriteStoreError>;

    /// The join-shaped listing (name-ordered), used as the comparator's
    /// baseline.
    fn products_with_category(&self, limit: usize) -> Result<Vec<CatalogRow>, WriteStoreError>;
}

impl<S> WriteStore for Arc<S>
where
    S: WriteStore + ?Sized,
{
    fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError> {
        (**self).create_category(name, description)
    }

    fn category(&self, id: CategoryId) -> Result<Option<ProductCategory>, WriteStoreError> {
        (**self).category(id)
    }

    fn update_category_description(
        &self,
        id: CategoryId,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError> {
        (**self).update_category_description(id, description)
    }

    fn delete_category(&self, id: CategoryId) -> Result<(), WriteStoreError> {
        (**self).delete_category(id)
    }

    fn create_product(&self, fields: NewProduct) -> Result<Product, WriteStoreError> {
        (**self).create_product(fields)
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, WriteStoreError> {
        (**self).product(id)
    }

    fn product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, WriteStoreError> {
        (**self).product_by_sku(sku)
    }

    fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, WriteStoreError> {
        (**self).update_product(id, update)
    }

    fn delete_product(&self, id: ProductId) -> Result<(), WriteStoreError> {
        (**self).delete_product(id)
    }

    fn product_count(&self) -> Result<u64, WriteStoreError> {
        (**self).product_count()
    }

    fn apply_stock_change(
        &self,
        product_id: ProductId,
        change: StockChange,
        notes: &str,
    ) -> Result<LedgerEntry, WriteStoreError> {
        (**self).apply_stock_change(product_id, change, notes)
    }

    fn ledger_for(&self, product_id: ProductId) -> Result<Vec<LedgerEntry>, WriteStoreError> {
        (**self).ledger_for(product_id)
    }

    fn product_page(
        &self,
        cursor: Option<&Sku>,
        limit: usize,
    ) -> Result<ProductPage, WriteStoreError> {
        (**self).product_page(cursor, limit)
    }

    fn products_with_category(&self, limit: usize) -> Result<Vec<CatalogRow>, WriteStoreError> {
        (**self).products_with_category(limit)
    }
}
