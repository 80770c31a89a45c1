use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::db::{ObservationRepository, ObservationStore};
use crate::fetcher::CwaFetcher;
use crate::scheduler;
use crate::services::{IngestService, WeatherService};

/// Application with all spawned background tasks and server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub sync_scheduler_handle: Option<JoinHandle<()>>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// This wires the store, services and fetcher, and spawns:
    /// - HTTP API server (Axum)
    /// - Sync scheduler (hourly by default, unless disabled)
    ///
    /// `pool` is `None` when no database is configured; the server still
    /// starts, queries fail and syncs are skipped.
    pub async fn build(
        config: Config,
        pool: Option<PgPool>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let store: Option<Arc<dyn ObservationStore>> = match pool {
            Some(pool) => Some(Arc::new(ObservationRepository::new(pool))),
            None => {
                warn!("No database available; queries will fail and syncs will be skipped");
                None
            }
        };
        if config.cwa_api_token.is_none() {
            warn!("No CWA_API_TOKEN configured; sync cycles will be skipped");
        }

        let ingest_service = IngestService::new(
            CwaFetcher::new(config.cwa_api_url.clone()),
            config.cwa_api_token.clone(),
            store.clone(),
        )
        .with_chunk_size(config.sync_chunk_size)
        .with_write_concurrency(config.sync_write_concurrency);
        let weather_service = WeatherService::new(store);

        let sync_scheduler_handle = if config.sync_scheduler_enabled {
            let ingest_service_clone = ingest_service.clone();
            let interval = config.sync_interval_minutes;

            Some(tokio::spawn(async move {
                scheduler::start_sync_scheduler(ingest_service_clone, interval).await;
            }))
        } else {
            info!("Sync scheduler disabled");
            None
        };

        let app_state = AppState {
            weather_service,
            ingest_service,
        };
        let app = create_router(app_state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            sync_scheduler_handle,
        })
    }

    /// Run until the server stops (which runs indefinitely unless error)
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
