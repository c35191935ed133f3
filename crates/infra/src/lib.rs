//! `stockline-infra` — stores, synchronization, and the application facade.
//!
//! The write store is authoritative; the read store is a derived, disposable
//! projection. Everything here composes through the two store traits, so the
//! in-memory reference backends used in tests are swappable with real
//! database-backed implementations without touching the sync logic.

pub mod comparator;
pub mod projector;
pub mod read_store;
pub mod reconciliation;
pub mod service;
pub mod write_store;

#[cfg(test)]
mod integration_tests;

pub use comparator::{CompareError, QueryComparator, QueryComparison, QuerySample, QuerySource};
pub use projector::{Projector, ReplicationResult};
pub use read_store::{
    CategorySnapshot, DocumentFilter, InMemoryReadStore, ReadDocument, ReadStore, ReadStoreError,
    SortKey,
};
pub use reconciliation::{ReconcileError, ReconciliationJob, ReconciliationReport};
pub use service::{InventoryService, InventoryStats};
pub use write_store::{CatalogRow, InMemoryWriteStore, ProductPage, WriteStore, WriteStoreError};
