use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument, warn};

use crate::services::IngestService;

/// Run a sync cycle every `interval_minutes`, forever
///
/// The first cycle runs immediately. Results are only logged; nothing is
/// reported back to a caller.
#[instrument(skip(ingest_service), fields(interval_minutes = %interval_minutes))]
pub async fn start_sync_scheduler(ingest_service: IngestService, interval_minutes: u64) {
    let mut interval = time::interval(Duration::from_secs(interval_minutes.max(1) * 60));
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    info!("Sync scheduler started with {} minute interval", interval_minutes);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - running weather data sync");

        match ingest_service.sync().await {
            Ok(report) => match report.skipped {
                Some(reason) => warn!("Scheduled sync skipped: {:?}", reason),
                None if report.failed_chunks > 0 => warn!(
                    "Scheduled sync stored {} of {} observations ({} chunks failed)",
                    report.persisted,
                    report.built - report.duplicates,
                    report.failed_chunks
                ),
                None => info!("Scheduled sync stored {} observations", report.persisted),
            },
            Err(e) => {
                error!("Scheduled sync failed: {}", e);
            }
        }
    }
}
