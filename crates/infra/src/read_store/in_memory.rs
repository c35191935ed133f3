use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value as JsonValue;

use stockline_inventory::Sku;

use super::{DocumentFilter, ReadDocument, ReadStore, ReadStoreError, SortKey};

/// In-memory read store for tests and development.
///
/// Documents are held as serialized JSON values keyed by sku, mirroring a
/// document database: the schema is enforced at the serialization boundary
/// on the way in and out, not by the container. An availability switch lets
/// tests and drills take the store "offline" so outage handling in the sync
/// path can be exercised end to end.
#[derive(Debug)]
pub struct InMemoryReadStore {
    documents: RwLock<BTreeMap<String, JsonValue>>,
    available: AtomicBool,
}

impl Default for InMemoryReadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReadStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated reachability. While unavailable, every operation
    /// fails with [`ReadStoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), ReadStoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ReadStoreError::Unavailable(
                "read store is offline".to_string(),
            ))
        }
    }

    fn decode(value: &JsonValue) -> Result<ReadDocument, ReadStoreError> {
        serde_json::from_value(value.clone()).map_err(|e| ReadStoreError::Backend(e.to_string()))
    }
}

impl ReadStore for InMemoryReadStore {
    fn ping(&self) -> Result<(), ReadStoreError> {
        self.check_available()
    }

    fn upsert(&self, document: ReadDocument) -> Result<(), ReadStoreError> {
        self.check_available()?;
        let key = document.sku.to_string();
        let value =
            serde_json::to_value(&document).map_err(|e| ReadStoreError::Backend(e.to_string()))?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| ReadStoreError::Backend("document lock poisoned".to_string()))?;
        documents.insert(key, value);
        Ok(())
    }

    fn get(&self, sku: &Sku) -> Result<Option<ReadDocument>, ReadStoreError> {
        self.check_available()?;
        let documents = self
            .documents
            .read()
            .map_err(|_| ReadStoreError::Backend("document lock poisoned".to_string()))?;
        documents
            .get(sku.as_str())
            .map(Self::decode)
            .transpose()
    }

    fn find_all(&self, limit: usize, sort: SortKey) -> Result<Vec<ReadDocument>, ReadStoreError> {
        self.check_available()?;
        let documents = self
            .documents
            .read()
            .map_err(|_| ReadStoreError::Backend("document lock poisoned".to_string()))?;
        let mut decoded = documents
            .values()
            .map(Self::decode)
            .collect::<Result<Vec<_>, _>>()?;
        match sort {
            SortKey::Name => decoded.sort_by(|a, b| {
                a.name.cmp(&b.name).then_with(|| a.sku.cmp(&b.sku))
            }),
            SortKey::Sku => decoded.sort_by(|a, b| a.sku.cmp(&b.sku)),
            SortKey::UpdatedAt => decoded.sort_by_key(|d| d.updated_at),
        }
        decoded.truncate(limit);
        Ok(decoded)
    }

    fn count(&self, filter: DocumentFilter) -> Result<u64, ReadStoreError> {
        self.check_available()?;
        let documents = self
            .documents
            .read()
            .map_err(|_| ReadStoreError::Backend("document lock poisoned".to_string()))?;
        match filter {
            DocumentFilter::All => Ok(documents.len() as u64),
            DocumentFilter::LowStock => {
                let mut matches = 0;
                for value in documents.values() {
                    if Self::decode(value)?.is_low_stock() {
                        matches += 1;
                    }
                }
                Ok(matches)
            }
        }
    }
}
