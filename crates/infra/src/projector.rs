//! Projection of write-model products into the read store.

use tracing::{debug, warn};

use stockline_inventory::{Product, ProductCategory};

use crate::read_store::{ReadDocument, ReadStore, ReadStoreError};

/// Outcome of one projection attempt.
///
/// Failures are data, not exceptions: the projector never raises past its
/// boundary. The synchronous write path logs and moves on; reconciliation
/// counts and continues. Retry policy belongs to the caller.
#[derive(Debug)]
pub enum ReplicationResult {
    Synced,
    Failed { cause: ReadStoreError },
}

impl ReplicationResult {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Maps one product (plus its category) into a denormalized document and
/// upserts it into the read store, keyed by sku.
///
/// The upsert replaces the whole document, so re-running a projection with
/// unchanged source data is a no-op in effect. That idempotence is what
/// makes reconciliation safe to run concurrently with live traffic. The
/// caller must pass just-committed write-store state, never a stale cache.
#[derive(Debug)]
pub struct Projector<R> {
    read_store: R,
}

impl<R: ReadStore> Projector<R> {
    pub fn new(read_store: R) -> Self {
        Self { read_store }
    }

    /// Probe the sink. Used by reconciliation as its fatal precondition.
    pub fn ping(&self) -> Result<(), ReadStoreError> {
        self.read_store.ping()
    }

    pub fn project(&self, product: &Product, category: &ProductCategory) -> ReplicationResult {
        let document = ReadDocument::denormalize(product, category);
        let sku = document.sku.clone();
        match self.read_store.upsert(document) {
            Ok(()) => {
                debug!(%sku, "product projected to read store");
                ReplicationResult::Synced
            }
            Err(cause) => {
                warn!(%sku, error = %cause, "projection to read store failed");
                ReplicationResult::Failed { cause }
            }
        }
    }
}
