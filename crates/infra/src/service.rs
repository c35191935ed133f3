//! Application facade: the write path wired to projection, plus the read
//! surface the boundary layers consume.

use tracing::{debug, warn};

use stockline_core::{CategoryId, ProductId};
use stockline_inventory::{
    LedgerEntry, NewProduct, Product, ProductCategory, ProductUpdate, Sku, StockChange,
};

use crate::comparator::{CompareError, QueryComparator, QueryComparison};
use crate::projector::Projector;
use crate::read_store::{DocumentFilter, ReadDocument, ReadStore, ReadStoreError, SortKey};
use crate::reconciliation::{ReconcileError, ReconciliationJob, ReconciliationReport};
use crate::write_store::{WriteStore, WriteStoreError};

/// Aggregate figures served from the read store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryStats {
    pub total_products: u64,
    pub low_stock_items: u64,
}

/// Dependency-injected composition of the two stores and the projector.
///
/// Store handles are constructed explicitly and passed in (opened at
/// process start, closed at shutdown), never fetched from ambient state.
/// Callers are assumed to be authorized already; access control happens at
/// the boundary, not here.
///
/// Every mutating operation commits to the write store first and projects
/// afterwards, holding no write-store lock during the projection's I/O. A
/// projection failure is logged and swallowed: the authoritative data is
/// already committed and must never be rolled back by a downstream problem.
/// The stores are allowed to diverge transiently; reconciliation repairs
/// the drift.
#[derive(Debug)]
pub struct InventoryService<W, R> {
    write_store: W,
    read_store: R,
    projector: Projector<R>,
}

impl<W, R> InventoryService<W, R>
where
    W: WriteStore + Clone,
    R: ReadStore + Clone,
{
    pub fn new(write_store: W, read_store: R) -> Self {
        Self {
            projector: Projector::new(read_store.clone()),
            write_store,
            read_store,
        }
    }

    // --- categories -----------------------------------------------------

    pub fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError> {
        self.write_store.create_category(name, description)
    }

    pub fn update_category_description(
        &self,
        id: CategoryId,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError> {
        // Documents embed only the category id and name, so no re-projection
        // is needed for a description edit.
        self.write_store.update_category_description(id, description)
    }

    pub fn delete_category(&self, id: CategoryId) -> Result<(), WriteStoreError> {
        self.write_store.delete_category(id)
    }

    // --- products (write path) ------------------------------------------

    pub fn create_product(&self, fields: NewProduct) -> Result<Product, WriteStoreError> {
        let product = self.write_store.create_product(fields)?;
        self.project_committed(&product);
        Ok(product)
    }

    pub fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, WriteStoreError> {
        let product = self.write_store.update_product(id, update)?;
        self.project_committed(&product);
        Ok(product)
    }

    /// Apply a ledgered stock mutation, then re-project the product.
    ///
    /// The write store commits the stock value and the ledger entry as one
    /// unit before any projection I/O starts; the entry is returned even
    /// when the projection afterwards fails.
    pub fn apply_stock_change(
        &self,
        product_id: ProductId,
        change: StockChange,
        notes: &str,
    ) -> Result<LedgerEntry, WriteStoreError> {
        let entry = self.write_store.apply_stock_change(product_id, change, notes)?;
        self.project_by_id(product_id);
        Ok(entry)
    }

    pub fn delete_product(&self, id: ProductId) -> Result<(), WriteStoreError> {
        self.write_store.delete_product(id)?;
        // The sync path never deletes documents; a stale document for a
        // deleted product persists until a rebuild against a fresh store.
        debug!(product_id = %id, "product deleted; read document left for reconciliation");
        Ok(())
    }

    pub fn product(&self, id: ProductId) -> Result<Option<Product>, WriteStoreError> {
        self.write_store.product(id)
    }

    pub fn product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, WriteStoreError> {
        self.write_store.product_by_sku(sku)
    }

    pub fn ledger_for(&self, product_id: ProductId) -> Result<Vec<LedgerEntry>, WriteStoreError> {
        self.write_store.ledger_for(product_id)
    }

    // --- read surface ----------------------------------------------------

    pub fn find_all(
        &self,
        limit: usize,
        sort: SortKey,
    ) -> Result<Vec<ReadDocument>, ReadStoreError> {
        self.read_store.find_all(limit, sort)
    }

    pub fn document(&self, sku: &Sku) -> Result<Option<ReadDocument>, ReadStoreError> {
        self.read_store.get(sku)
    }

    pub fn count(&self, filter: DocumentFilter) -> Result<u64, ReadStoreError> {
        self.read_store.count(filter)
    }

    pub fn stats(&self) -> Result<InventoryStats, ReadStoreError> {
        Ok(InventoryStats {
            total_products: self.read_store.count(DocumentFilter::All)?,
            low_stock_items: self.read_store.count(DocumentFilter::LowStock)?,
        })
    }

    // --- synchronization -------------------------------------------------

    pub fn reconcile(&self) -> Result<ReconciliationReport, ReconcileError> {
        ReconciliationJob::new(self.write_store.clone(), self.read_store.clone()).run_full()
    }

    pub fn compare_queries(&self, limit: usize) -> Result<QueryComparison, CompareError> {
        QueryComparator::new(self.write_store.clone(), self.read_store.clone()).compare(limit)
    }

    // --- projection plumbing ---------------------------------------------

    /// Re-read the just-committed product and project it. Any failure on
    /// this path is logged and dropped; the write has already committed.
    fn project_by_id(&self, product_id: ProductId) {
        match self.write_store.product(product_id) {
            Ok(Some(product)) => self.project_committed(&product),
            Ok(None) => {
                warn!(%product_id, "product disappeared before projection");
            }
            Err(err) => {
                warn!(%product_id, error = %err, "re-read for projection failed");
            }
        }
    }

    fn project_committed(&self, product: &Product) {
        let category = match self.write_store.category(product.category_id()) {
            Ok(Some(category)) => category,
            Ok(None) => {
                warn!(sku = %product.sku(), "category missing at projection time");
                return;
            }
            Err(err) => {
                warn!(sku = %product.sku(), error = %err, "category read for projection failed");
                return;
            }
        };
        // Outcome already logged by the projector; the write path neither
        // retries nor propagates.
        let _ = self.projector.project(product, &category);
    }
}
