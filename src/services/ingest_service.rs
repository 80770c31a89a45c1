use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::db::{Observation, ObservationStore};
use crate::fetcher::{CwaFetcher, ObservationWindow};
use crate::ingest::build_observations;
use crate::services::batch_writer::{BatchWriter, DEFAULT_CHUNK_SIZE};
use crate::services::ServiceError;

/// Why a sync cycle ended before contacting the upstream API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    StoreNotConfigured,
    MissingCredential,
}

/// Counts reported by one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyncReport {
    pub locations: usize,
    pub built: usize,
    pub duplicates: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub persisted: usize,
    pub skipped: Option<SkipReason>,
}

impl SyncReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Default::default()
        }
    }
}

/// Fetches the trailing window from CWA, normalizes it and writes it to the store
#[derive(Clone)]
pub struct IngestService {
    fetcher: CwaFetcher,
    credential: Option<String>,
    store: Option<Arc<dyn ObservationStore>>,
    chunk_size: usize,
    write_concurrency: usize,
}

impl IngestService {
    pub fn new(
        fetcher: CwaFetcher,
        credential: Option<String>,
        store: Option<Arc<dyn ObservationStore>>,
    ) -> Self {
        Self {
            fetcher,
            credential,
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_concurrency: 1,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_write_concurrency(mut self, write_concurrency: usize) -> Self {
        self.write_concurrency = write_concurrency;
        self
    }

    /// Run one sync cycle ending now
    pub async fn sync(&self) -> Result<SyncReport, ServiceError> {
        self.sync_at(Utc::now()).await
    }

    /// Run one sync cycle for the window ending at `now`
    ///
    /// Only upstream fetch failures are returned as errors. A missing store or
    /// credential ends the cycle early, and failed chunks reduce `persisted`.
    #[instrument(skip(self))]
    pub async fn sync_at(&self, now: DateTime<Utc>) -> Result<SyncReport, ServiceError> {
        let Some(store) = &self.store else {
            error!("Store not configured, skipping sync");
            return Ok(SyncReport::skipped(SkipReason::StoreNotConfigured));
        };
        let Some(credential) = self.credential.as_deref() else {
            error!("Missing CWA API token, skipping sync");
            return Ok(SyncReport::skipped(SkipReason::MissingCredential));
        };

        let window = ObservationWindow::ending_at(now);
        let locations = self
            .fetcher
            .fetch_locations(credential, &window)
            .await
            .map_err(|e| {
                error!("Failed to fetch from CWA API: {}", e);
                e
            })?;

        let mut rows = Vec::new();
        for location in &locations {
            match location.resolve_station_id() {
                Some(station_id) => rows.extend(build_observations(&station_id, location)),
                None => warn!(
                    "Skipping location without a station id ({} hourly elements)",
                    location.hourly_elements().len()
                ),
            }
        }

        let built = rows.len();
        let rows = deduplicate(rows);
        let mut report = SyncReport {
            locations: locations.len(),
            built,
            duplicates: built - rows.len(),
            ..Default::default()
        };

        if rows.is_empty() {
            info!("No observations to store for window ending {}", window.time_to);
            return Ok(report);
        }

        let written = BatchWriter::new(Arc::clone(store))
            .with_chunk_size(self.chunk_size)
            .with_concurrency(self.write_concurrency)
            .write(&rows)
            .await;

        report.chunks = written.chunks;
        report.failed_chunks = written.failed_chunks;
        report.persisted = written.written;

        info!("Inserted {} hourly records successfully", report.persisted);
        Ok(report)
    }
}

/// Collapse rows sharing `(station_id, date)`
///
/// The last occurrence's values win and take the position of the first, so
/// a single upsert statement never touches the same key twice.
pub fn deduplicate(rows: Vec<Observation>) -> Vec<Observation> {
    let mut positions: HashMap<(String, DateTime<FixedOffset>), usize> = HashMap::new();
    let mut unique: Vec<Observation> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = (row.station_id.clone(), row.date);
        match positions.get(&key) {
            Some(&index) => unique[index] = row,
            None => {
                positions.insert(key, unique.len());
                unique.push(row);
            }
        }
    }

    unique
}
