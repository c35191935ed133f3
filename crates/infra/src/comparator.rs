//! Side-by-side timing of the join-shaped query and the read-store scan.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::read_store::{ReadDocument, ReadStore, ReadStoreError, SortKey};
use crate::write_store::{CatalogRow, WriteStore, WriteStoreError};

/// Which store produced a sample.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuerySource {
    WriteStore,
    ReadStore,
}

/// One timed query execution: the rows, how many, and the wall-clock time
/// it took. The elapsed figure is the whole point of this type.
#[derive(Debug, Clone)]
pub struct QuerySample<T> {
    pub source: QuerySource,
    pub count: usize,
    pub elapsed: Duration,
    pub data: Vec<T>,
}

/// The two samples of one comparison run.
#[derive(Debug, Clone)]
pub struct QueryComparison {
    pub write: QuerySample<CatalogRow>,
    pub read: QuerySample<ReadDocument>,
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("write store query failed: {0}")]
    WriteStore(#[from] WriteStoreError),

    #[error("read store query failed: {0}")]
    ReadStore(#[from] ReadStoreError),
}

/// Diagnostic harness, not a state machine: runs the same logical "list
/// products" request against both stores and reports what each one cost.
/// The write side pays for the join; the read side scans denormalized
/// documents. The gap between the two elapsed times is what the CQRS split
/// buys.
#[derive(Debug)]
pub struct QueryComparator<W, R> {
    write_store: W,
    read_store: R,
}

impl<W: WriteStore, R: ReadStore> QueryComparator<W, R> {
    pub fn new(write_store: W, read_store: R) -> Self {
        Self {
            write_store,
            read_store,
        }
    }

    pub fn compare(&self, limit: usize) -> Result<QueryComparison, CompareError> {
        let started = Instant::now();
        let rows = self.write_store.products_with_category(limit)?;
        let write = QuerySample {
            source: QuerySource::WriteStore,
            count: rows.len(),
            elapsed: started.elapsed(),
            data: rows,
        };

        let started = Instant::now();
        let documents = self.read_store.find_all(limit, SortKey::Name)?;
        let read = QuerySample {
            source: QuerySource::ReadStore,
            count: documents.len(),
            elapsed: started.elapsed(),
            data: documents,
        };

        Ok(QueryComparison { write, read })
    }
}
