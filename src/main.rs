use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weather_sync_service::app::Application;
use weather_sync_service::config::Config;
use weather_sync_service::db::connect_optional;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,weather_sync_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    info!("Starting weather sync service with config: {:?}", config);

    info!("Connecting to database...");
    let pool = connect_optional(
        config.database_url.as_deref(),
        config.database_max_connections,
        config.database_connect_retries,
    )
    .await;

    if let Some(pool) = &pool {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations completed");
    }

    let application = Application::build(config, pool).await?;
    application.run_until_stopped().await
}
