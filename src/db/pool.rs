use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::db::DbError;

/// Connect to Postgres, retrying with exponential backoff while the database comes up
#[instrument(skip(database_url))]
pub async fn connect_with_retry(
    database_url: &str,
    max_connections: u32,
    max_retries: usize,
) -> Result<PgPool, DbError> {
    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(30))
        .with_max_times(max_retries);

    let pool = (|| async {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
    })
    .retry(backoff)
    .notify(|err: &sqlx::Error, delay: Duration| {
        warn!("Database connection failed, retrying in {:?}: {}", delay, err);
    })
    .await?;

    info!("Database connection established");
    Ok(pool)
}

/// Pool for the configured database, or `None` when there is none to use
///
/// An unreachable database is not fatal: the service starts without a store,
/// queries report it as unavailable and sync cycles are skipped.
pub async fn connect_optional(
    database_url: Option<&str>,
    max_connections: u32,
    max_retries: usize,
) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        warn!("Missing or placeholder DATABASE_URL; starting without a database");
        return None;
    };

    match connect_with_retry(database_url, max_connections, max_retries).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("Database unavailable after retries, starting without a store: {}", e);
            None
        }
    }
}
