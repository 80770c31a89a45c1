use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::db::{Condition, ObservationResponse};
use crate::services::{IngestService, SkipReason, SyncReport, WeatherService};

#[derive(Clone)]
pub struct AppState {
    pub weather_service: WeatherService,
    pub ingest_service: IngestService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct SyncResponse {
    pub message: String,
    pub report: SyncReport,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQuery {
    /// Restrict results to one station
    #[serde(rename = "stationId")]
    pub station_id: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(health, get_weather, trigger_sync),
    components(schemas(
        HealthResponse,
        SyncResponse,
        ErrorResponse,
        ObservationResponse,
        Condition,
        SyncReport,
        SkipReason
    )),
    tags((name = "weather", description = "Hourly station observations"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/weather", get(get_weather))
        .route("/sync", post(trigger_sync))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "weather",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Up to 720 observations, newest first", body = [ObservationResponse]),
        (status = 500, description = "Store unavailable or not configured", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<Vec<ObservationResponse>>, ApiError> {
    debug!("Fetching weather data for {:?}", params.station_id);
    let observations = state
        .weather_service
        .get_weather(params.station_id.as_deref())
        .await
        .map_err(|e| {
            error!("Error fetching weather data: {}", e);
            internal_error("Failed to fetch weather data")
        })?;

    info!("Returning {} observations", observations.len());
    Ok(Json(observations))
}

#[utoipa::path(
    post,
    path = "/api/sync",
    tag = "weather",
    responses(
        (status = 200, description = "Sync cycle finished", body = SyncResponse),
        (status = 500, description = "Upstream fetch failed", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn trigger_sync(State(state): State<AppState>) -> Result<Json<SyncResponse>, ApiError> {
    info!("Manual sync requested");
    let report = state.ingest_service.sync().await.map_err(|e| {
        error!("Error syncing data: {}", e);
        internal_error("Failed to sync weather data")
    })?;

    let message = match report.skipped {
        Some(reason) => {
            warn!("Manual sync skipped: {:?}", reason);
            "Sync skipped"
        }
        None => "Sync complete",
    };

    Ok(Json(SyncResponse {
        message: message.to_string(),
        report,
    }))
}
