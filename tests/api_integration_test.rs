// API integration tests that verify HTTP endpoints
// Drives the Axum router in-process with `oneshot`, backed by the in-memory store

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{cwa_body, cwa_location, observation, MemoryStore};
use http_body_util::BodyExt; // For `.collect()`
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot`
use weather_sync_service::api::{create_router, generate_openapi_spec, AppState};
use weather_sync_service::db::ObservationStore;
use weather_sync_service::fetcher::CwaFetcher;
use weather_sync_service::services::{IngestService, WeatherService};

const DATASET_PATH: &str = "/api/v1/rest/datastore/C-B0024-001";

fn app_state(store: Option<Arc<MemoryStore>>, upstream_url: &str) -> AppState {
    let store = store.map(|store| store as Arc<dyn ObservationStore>);
    AppState {
        weather_service: WeatherService::new(store.clone()),
        ingest_service: IngestService::new(
            CwaFetcher::new(format!("{upstream_url}{DATASET_PATH}")),
            Some("CWA-TEST-TOKEN".to_string()),
            store,
        ),
    }
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = app_state(None, "http://127.0.0.1:9");

    let (status, body) = send(state, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_weather_endpoint_returns_camel_case_rows() {
    let store = MemoryStore::shared();
    let mut row = observation("C0A520", "2026-02-23T01:00:00+08:00", 18.4);
    row.wind_dir = Some(90.0);
    store.seed([row]);
    let state = app_state(Some(store), "http://127.0.0.1:9");

    let (status, body) = send(state, get("/api/weather")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("Expected array response");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["stationId"], "C0A520");
    assert_eq!(row["avgTemp"], 18.4);
    assert_eq!(row["minTemp"], 18.4);
    assert_eq!(row["maxTemp"], 18.4);
    assert_eq!(row["windSpeed"], 1.5);
    assert_eq!(row["wind_dir"], 90.0);
    assert_eq!(row["condition"], "Sunny");
    assert!(row["date"]
        .as_str()
        .unwrap()
        .starts_with("2026-02-23T01:00:00"));
    assert!(row.get("station_id").is_none());
    assert!(row.get("windDir").is_none());
}

#[tokio::test]
async fn test_weather_endpoint_filters_by_station_query() {
    let store = MemoryStore::shared();
    store.seed([
        observation("C0A520", "2026-02-23T01:00:00+08:00", 18.0),
        observation("C0A530", "2026-02-23T01:00:00+08:00", 19.0),
    ]);
    let state = app_state(Some(store), "http://127.0.0.1:9");

    let (status, body) = send(state, get("/api/weather?stationId=C0A530")).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["stationId"], "C0A530");
}

#[tokio::test]
async fn test_weather_endpoint_serializes_nulls() {
    let store = MemoryStore::shared();
    let mut row = observation("C0A520", "2026-02-23T01:00:00+08:00", 18.0);
    row.wind_dir = None;
    row.humidity = None;
    store.seed([row]);
    let state = app_state(Some(store), "http://127.0.0.1:9");

    let (_, body) = send(state, get("/api/weather")).await;

    assert_eq!(body[0]["wind_dir"], Value::Null);
    assert_eq!(body[0]["humidity"], Value::Null);
    assert!(body[0].as_object().unwrap().contains_key("wind_dir"));
}

#[tokio::test]
async fn test_weather_endpoint_without_store_returns_500() {
    let state = app_state(None, "http://127.0.0.1:9");

    let (status, body) = send(state, get("/api/weather")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch weather data" }));
}

#[tokio::test]
async fn test_sync_endpoint_reports_counts() {
    let mut server = Server::new_async().await;
    let hour = json!({
        "DateTime": "2026-02-23T01:00:00+08:00",
        "weatherElements": { "AirTemperature": "21.0", "Precipitation": "2.0" }
    });
    server
        .mock("GET", DATASET_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(cwa_body(json!([cwa_location("C0A520", json!([hour]))])))
        .create_async()
        .await;

    let store = MemoryStore::shared();
    let state = app_state(Some(store.clone()), &server.url());

    let (status, body) = send(state, post("/api/sync")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sync complete");
    assert_eq!(body["report"]["persisted"], 1);
    assert_eq!(body["report"]["skipped"], Value::Null);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_sync_endpoint_without_store_is_skipped() {
    let state = app_state(None, "http://127.0.0.1:9");

    let (status, body) = send(state, post("/api/sync")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sync skipped");
    assert_eq!(body["report"]["skipped"], "store_not_configured");
}

#[tokio::test]
async fn test_sync_endpoint_upstream_failure_returns_500() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", DATASET_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let state = app_state(Some(MemoryStore::shared()), &server.url());

    let (status, body) = send(state, post("/api/sync")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to sync weather data");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let state = app_state(None, "http://127.0.0.1:9");

    let (status, _) = send(state, get("/api/stations")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn test_openapi_spec_lists_endpoints() {
    let spec = serde_json::to_value(generate_openapi_spec()).unwrap();

    let paths = spec["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/health"));
    assert!(paths.contains_key("/api/weather"));
    assert!(paths.contains_key("/api/sync"));
    assert!(spec["components"]["schemas"]
        .as_object()
        .unwrap()
        .contains_key("ObservationResponse"));
}
