use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weather_sync_service::db::{connect_with_retry, ObservationRepository, ObservationStore};
use weather_sync_service::fetcher::{CwaFetcher, DEFAULT_CWA_API_URL};
use weather_sync_service::services::IngestService;

#[derive(Parser)]
#[command(name = "sync-once")]
#[command(about = "Run a single CWA observation sync cycle and print the report", long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env)]
    database_url: String,

    /// CWA open data API token
    #[arg(long, env)]
    cwa_api_token: String,

    /// Observation dataset endpoint
    #[arg(long, env, default_value = DEFAULT_CWA_API_URL)]
    cwa_api_url: String,

    /// Rows per upsert statement
    #[arg(long, env = "SYNC_CHUNK_SIZE", default_value = "1000")]
    chunk_size: usize,

    /// Chunks written concurrently
    #[arg(long, env = "SYNC_WRITE_CONCURRENCY", default_value = "1")]
    write_concurrency: usize,

    /// Connection attempts after the first before giving up
    #[arg(long, env = "DATABASE_CONNECT_RETRIES", default_value = "5")]
    connect_retries: usize,

    /// Apply pending migrations before syncing
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let pool = connect_with_retry(&cli.database_url, 2, cli.connect_retries).await?;
    if cli.migrate {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let store: Arc<dyn ObservationStore> = Arc::new(ObservationRepository::new(pool));
    let service = IngestService::new(
        CwaFetcher::new(cli.cwa_api_url),
        Some(cli.cwa_api_token),
        Some(store),
    )
    .with_chunk_size(cli.chunk_size.max(1))
    .with_write_concurrency(cli.write_concurrency.max(1));

    let report = match service.sync().await {
        Ok(report) => report,
        Err(e) => {
            error!("Sync failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failed_chunks > 0 {
        error!("{} of {} chunks failed", report.failed_chunks, report.chunks);
        std::process::exit(1);
    }

    Ok(())
}
