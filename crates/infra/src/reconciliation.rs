//! Full resynchronization of the read store from the authoritative store.

use thiserror::Error;

use tracing::{info, warn};

use stockline_inventory::Sku;

use crate::projector::{Projector, ReplicationResult};
use crate::read_store::{ReadStore, ReadStoreError};
use crate::write_store::{WriteStore, WriteStoreError};

/// Per-item tally of one full reconciliation run. `total` counts every
/// product seen; `synced + failed == total`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub total: u64,
    pub synced: u64,
    pub failed: u64,
}

/// Fatal reconciliation failure.
///
/// The asymmetry is intentional: an unreachable sink at start, or a source
/// that stops answering mid-scan, aborts the run, while one record that
/// fails to project is only counted. A single bad record must never abort a
/// 100,000-item resync.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("read store unreachable at job start: {0}")]
    ReadStoreUnavailable(#[source] ReadStoreError),

    #[error("write store scan failed: {0}")]
    WriteStore(#[from] WriteStoreError),
}

/// Batch driver that re-projects every product in the write store.
///
/// Used for bootstrap (empty read store) and for repairing drift. Streams
/// the source in sku-ordered pages; the store may hold hundreds of
/// thousands of rows, so the full set is never resident at once. Safe to
/// re-run at any time, including concurrently with live traffic, because
/// every projection is a whole-document idempotent upsert.
#[derive(Debug)]
pub struct ReconciliationJob<W, R> {
    write_store: W,
    projector: Projector<R>,
    page_size: usize,
    progress_every: u64,
}

impl<W: WriteStore, R: ReadStore> ReconciliationJob<W, R> {
    pub fn new(write_store: W, read_store: R) -> Self {
        Self {
            write_store,
            projector: Projector::new(read_store),
            page_size: 500,
            progress_every: 1000,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Run a full pass over every product. Never partial-aborts on item
    /// failures; reports the tally at the end.
    pub fn run_full(&self) -> Result<ReconciliationReport, ReconcileError> {
        self.projector
            .ping()
            .map_err(ReconcileError::ReadStoreUnavailable)?;

        info!("full reconciliation started");
        let mut report = ReconciliationReport::default();
        let mut cursor: Option<Sku> = None;

        loop {
            let page = self.write_store.product_page(cursor.as_ref(), self.page_size)?;
            for product in &page.products {
                report.total += 1;

                let category = match self.write_store.category(product.category_id()) {
                    Ok(Some(category)) => category,
                    Ok(None) => {
                        warn!(sku = %product.sku(), "product references a missing category");
                        report.failed += 1;
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                };

                match self.projector.project(product, &category) {
                    ReplicationResult::Synced => report.synced += 1,
                    ReplicationResult::Failed { .. } => report.failed += 1,
                }

                if report.total % self.progress_every == 0 {
                    info!(
                        total = report.total,
                        synced = report.synced,
                        failed = report.failed,
                        "reconciliation progress"
                    );
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(
            total = report.total,
            synced = report.synced,
            failed = report.failed,
            "full reconciliation complete"
        );
        Ok(report)
    }
}
