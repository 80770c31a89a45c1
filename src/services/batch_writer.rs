use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::db::{Observation, ObservationStore, CONFLICT_KEYS};

/// Rows per upsert call; about 12,000 hourly rows arrive per sync
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Outcome of writing one sync cycle's rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub chunks: usize,
    pub written: usize,
    pub failed_chunks: usize,
}

/// Writes observations in fixed-size chunks, best effort
///
/// Each chunk is an independent upsert. A failed chunk is logged and its rows
/// are left out of `written`; the remaining chunks are still attempted.
#[derive(Clone)]
pub struct BatchWriter {
    store: Arc<dyn ObservationStore>,
    chunk_size: usize,
    concurrency: usize,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn ObservationStore>) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: 1,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Number of chunks in flight at once; 1 writes them in order
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[instrument(skip(self, rows), fields(rows = rows.len(), chunk_size = self.chunk_size, concurrency = self.concurrency))]
    pub async fn write(&self, rows: &[Observation]) -> WriteReport {
        let writes: Vec<_> = rows
            .chunks(self.chunk_size)
            .enumerate()
            .map(|(index, chunk)| self.write_chunk(index, chunk))
            .collect();
        let outcomes: Vec<(usize, bool)> = stream::iter(writes)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let report = outcomes.iter().fold(
            WriteReport::default(),
            |mut report, (len, succeeded)| {
                report.chunks += 1;
                if *succeeded {
                    report.written += len;
                } else {
                    report.failed_chunks += 1;
                }
                report
            },
        );

        info!(
            "Wrote {} of {} rows in {} chunks ({} failed)",
            report.written,
            rows.len(),
            report.chunks,
            report.failed_chunks
        );
        report
    }

    /// Upsert one chunk, returning its row count and whether it was stored
    async fn write_chunk(&self, index: usize, chunk: &[Observation]) -> (usize, bool) {
        debug!("Upserting chunk {} ({} rows)", index, chunk.len());
        match self.store.upsert(chunk, &CONFLICT_KEYS).await {
            Ok(_) => (chunk.len(), true),
            Err(e) => {
                error!(
                    chunk = index,
                    rows = chunk.len(),
                    error = %e,
                    "Upsert failed for chunk, continuing with remaining chunks"
                );
                (chunk.len(), false)
            }
        }
    }
}
