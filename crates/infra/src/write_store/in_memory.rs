use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockline_core::{CategoryId, DomainError, ProductId};
use stockline_inventory::{
    LedgerEntry, NewProduct, Product, ProductCategory, ProductUpdate, Sku, StockChange,
};

use super::{CatalogRow, ProductPage, WriteStore, WriteStoreError};

/// In-memory write store for tests and development.
///
/// Each product row sits behind its own `Mutex`, so concurrent stock changes
/// on one product serialize (no lost updates) while different products
/// proceed in parallel under the shared catalog read lock. Lock order is
/// always catalog → product row → ledger.
#[derive(Debug, Default)]
pub struct InMemoryWriteStore {
    catalog: RwLock<Catalog>,
    ledger: Mutex<HashMap<ProductId, Vec<LedgerEntry>>>,
}

#[derive(Debug, Default)]
struct Catalog {
    categories: HashMap<CategoryId, ProductCategory>,
    category_names: HashMap<String, CategoryId>,
    category_refs: HashMap<CategoryId, usize>,
    products: HashMap<ProductId, Arc<Mutex<Product>>>,
    sku_index: BTreeMap<Sku, ProductId>,
}

fn poisoned(what: &str) -> WriteStoreError {
    WriteStoreError::Unavailable(format!("{what} lock poisoned"))
}

impl InMemoryWriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_catalog(&self) -> Result<RwLockReadGuard<'_, Catalog>, WriteStoreError> {
        self.catalog.read().map_err(|_| poisoned("catalog"))
    }

    fn write_catalog(&self) -> Result<RwLockWriteGuard<'_, Catalog>, WriteStoreError> {
        self.catalog.write().map_err(|_| poisoned("catalog"))
    }

}

impl WriteStore for InMemoryWriteStore {
    fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError> {
        let mut catalog = self.write_catalog()?;
        if catalog.category_names.contains_key(name) {
            return Err(DomainError::duplicate_key(format!("category name '{name}'")).into());
        }
        let category = ProductCategory::new(name, description)?;
        catalog
            .category_names
            .insert(category.name().to_string(), category.id_typed());
        catalog.categories.insert(category.id_typed(), category.clone());
        Ok(category)
    }

    fn category(&self, id: CategoryId) -> Result<Option<ProductCategory>, WriteStoreError> {
        Ok(self.read_catalog()?.categories.get(&id).cloned())
    }

    fn update_category_description(
        &self,
        id: CategoryId,
        description: &str,
    ) -> Result<ProductCategory, WriteStoreError> {
        let mut catalog = self.write_catalog()?;
        let category = catalog
            .categories
            .get_mut(&id)
            .ok_or_else(DomainError::not_found)?;
        category.set_description(description);
        Ok(category.clone())
    }

    fn delete_category(&self, id: CategoryId) -> Result<(), WriteStoreError> {
        let mut catalog = self.write_catalog()?;
        if !catalog.categories.contains_key(&id) {
            return Err(DomainError::not_found().into());
        }
        if catalog.category_refs.get(&id).copied().unwrap_or(0) > 0 {
            return Err(DomainError::referential_conflict(
                "category is referenced by existing products",
            )
            .into());
        }
        if let Some(category) = catalog.categories.remove(&id) {
            catalog.category_names.remove(category.name());
        }
        catalog.category_refs.remove(&id);
        Ok(())
    }

    fn create_product(&self, fields: NewProduct) -> Result<Product, WriteStoreError> {
        let mut catalog = self.write_catalog()?;
        if catalog.sku_index.contains_key(&fields.sku) {
            return Err(DomainError::duplicate_key(format!("sku '{}'", fields.sku)).into());
        }
        if !catalog.categories.contains_key(&fields.category_id) {
            return Err(DomainError::unknown_reference(format!(
                "category {}",
                fields.category_id
            ))
            .into());
        }
        let product = Product::new(fields)?;
        *catalog.category_refs.entry(product.category_id()).or_insert(0) += 1;
        catalog
            .sku_index
            .insert(product.sku().clone(), product.id_typed());
        catalog
            .products
            .insert(product.id_typed(), Arc::new(Mutex::new(product.clone())));
        Ok(product)
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, WriteStoreError> {
        let row = {
            let catalog = self.read_catalog()?;
            match catalog.products.get(&id) {
                Some(row) => row.clone(),
                None => return Ok(None),
            }
        };
        let product = row.lock().map_err(|_| poisoned("product row"))?.clone();
        Ok(Some(product))
    }

    fn product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, WriteStoreError> {
        let id = match self.read_catalog()?.sku_index.get(sku) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.product(id)
    }

    fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, WriteStoreError> {
        let catalog = self.read_catalog()?;
        let row = catalog
            .products
            .get(&id)
            .ok_or_else(DomainError::not_found)?;
        let mut product = row.lock().map_err(|_| poisoned("product row"))?;
        product.apply_update(update)?;
        Ok(product.clone())
    }

    fn delete_product(&self, id: ProductId) -> Result<(), WriteStoreError> {
        // The write lock excludes every in-flight mutation, so the ledger
        // check and the removal observe one consistent state.
        let mut catalog = self.write_catalog()?;
        let row = catalog
            .products
            .get(&id)
            .cloned()
            .ok_or_else(DomainError::not_found)?;
        let has_ledger_entries = self
            .ledger
            .lock()
            .map_err(|_| poisoned("ledger"))?
            .get(&id)
            .is_some_and(|entries| !entries.is_empty());
        if has_ledger_entries {
            return Err(DomainError::referential_conflict(
                "product has ledger entries",
            )
            .into());
        }
        let product = row.lock().map_err(|_| poisoned("product row"))?.clone();
        catalog.products.remove(&id);
        catalog.sku_index.remove(product.sku());
        if let Some(refs) = catalog.category_refs.get_mut(&product.category_id()) {
            *refs = refs.saturating_sub(1);
        }
        Ok(())
    }

    fn product_count(&self) -> Result<u64, WriteStoreError> {
        Ok(self.read_catalog()?.products.len() as u64)
    }

    fn apply_stock_change(
        &self,
        product_id: ProductId,
        change: StockChange,
        notes: &str,
    ) -> Result<LedgerEntry, WriteStoreError> {
        change.validate()?;
        let catalog = self.read_catalog()?;
        let row = catalog
            .products
            .get(&product_id)
            .ok_or_else(DomainError::not_found)?;

        // Row lock held across compute-and-write: concurrent changes to the
        // same product serialize here and never read the same previous stock.
        let mut product = row.lock().map_err(|_| poisoned("product row"))?;
        let mut ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;

        let entry = LedgerEntry::record(product_id, &change, product.stock_quantity(), notes);
        product.record_stock(entry.new_stock);
        ledger.entry(product_id).or_default().push(entry.clone());
        Ok(entry)
    }

    fn ledger_for(&self, product_id: ProductId) -> Result<Vec<LedgerEntry>, WriteStoreError> {
        let ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;
        Ok(ledger
            .get(&product_id)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    fn product_page(
        &self,
        cursor: Option<&Sku>,
        limit: usize,
    ) -> Result<ProductPage, WriteStoreError> {
        let catalog = self.read_catalog()?;
        let after: Box<dyn Iterator<Item = (&Sku, &ProductId)> + '_> = match cursor {
            Some(sku) => Box::new(
                catalog
                    .sku_index
                    .range((Bound::Excluded(sku), Bound::<&Sku>::Unbounded)),
            ),
            None => Box::new(catalog.sku_index.iter()),
        };

        let mut products = Vec::new();
        let mut has_more = false;
        for (_, id) in after {
            if products.len() == limit {
                has_more = true;
                break;
            }
            if let Some(row) = catalog.products.get(id) {
                products.push(row.lock().map_err(|_| poisoned("product row"))?.clone());
            }
        }
        let next_cursor = if has_more {
            products.last().map(|p| p.sku().clone())
        } else {
            None
        };
        Ok(ProductPage {
            products,
            next_cursor,
        })
    }

    fn products_with_category(&self, limit: usize) -> Result<Vec<CatalogRow>, WriteStoreError> {
        let catalog = self.read_catalog()?;
        let ledger = self.ledger.lock().map_err(|_| poisoned("ledger"))?;

        let mut rows = Vec::with_capacity(catalog.products.len());
        for (id, row) in &catalog.products {
            let product = row.lock().map_err(|_| poisoned("product row"))?.clone();
            let Some(category) = catalog.categories.get(&product.category_id()) else {
                continue;
            };
            rows.push(CatalogRow {
                category_name: category.name().to_string(),
                category_description: category.description().to_string(),
                transaction_count: ledger.get(id).map_or(0, |entries| entries.len() as u64),
                product,
            });
        }
        rows.sort_by(|a, b| {
            a.product
                .name()
                .cmp(b.product.name())
                .then_with(|| a.product.sku().cmp(b.product.sku()))
        });
        rows.truncate(limit);
        Ok(rows)
    }
}
