// Shared fixtures for integration tests
// An in-memory store stands in for Postgres so pipeline tests run without a database

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use futures::future::BoxFuture;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use weather_sync_service::db::{
    Condition, DateOrder, DbError, Observation, ObservationFilter, ObservationStore,
};

type Key = (String, DateTime<FixedOffset>);

/// Store keeping rows in a map keyed like the `weather_data` primary key
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<Key, Observation>>,
    upsert_calls: AtomicUsize,
    chunk_sizes: Mutex<Vec<usize>>,
    failing_calls: Mutex<HashSet<usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    upsert_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upsert sleeps for `delay`, so concurrent chunks overlap
    pub fn with_upsert_delay(delay: Duration) -> Self {
        Self {
            upsert_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make the `call`-th upsert (1-based) fail without writing anything
    pub fn fail_on_call(&self, call: usize) {
        self.failing_calls.lock().unwrap().insert(call);
    }

    pub fn seed(&self, rows: impl IntoIterator<Item = Observation>) {
        let mut stored = self.rows.lock().unwrap();
        for row in rows {
            stored.insert((row.station_id.clone(), row.date), row);
        }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, station_id: &str, date: &str) -> Option<Observation> {
        let date = DateTime::parse_from_rfc3339(date).unwrap();
        self.rows
            .lock()
            .unwrap()
            .get(&(station_id.to_string(), date))
            .cloned()
    }
}

impl ObservationStore for MemoryStore {
    fn upsert<'a>(
        &'a self,
        rows: &'a [Observation],
        conflict_keys: &'a [&'a str],
    ) -> BoxFuture<'a, Result<u64, DbError>> {
        Box::pin(async move {
            assert_eq!(conflict_keys, ["station_id", "date"]);

            let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.chunk_sizes.lock().unwrap().push(rows.len());

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(delay) = self.upsert_delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing_calls.lock().unwrap().contains(&call) {
                return Err(DbError::SqlxError(sqlx::Error::PoolTimedOut));
            }

            self.seed(rows.iter().cloned());
            Ok(rows.len() as u64)
        })
    }

    fn select<'a>(
        &'a self,
        filter: &'a ObservationFilter,
        order: DateOrder,
        limit: i64,
    ) -> BoxFuture<'a, Result<Vec<Observation>, DbError>> {
        Box::pin(async move {
            let mut rows: Vec<Observation> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|row| {
                    filter
                        .station_id
                        .as_deref()
                        .map_or(true, |id| row.station_id == id)
                })
                .cloned()
                .collect();

            rows.sort_by(|a, b| {
                let by_date = match order {
                    DateOrder::Ascending => a.date.cmp(&b.date),
                    DateOrder::Descending => b.date.cmp(&a.date),
                };
                by_date.then_with(|| a.station_id.cmp(&b.station_id))
            });
            rows.truncate(limit.max(0) as usize);
            Ok(rows)
        })
    }
}

/// Observation with every measurement set from `temp`
pub fn observation(station_id: &str, date: &str, temp: f64) -> Observation {
    Observation {
        station_id: station_id.to_string(),
        date: DateTime::parse_from_rfc3339(date).unwrap(),
        avg_temp: Some(temp),
        min_temp: Some(temp),
        max_temp: Some(temp),
        precipitation: Some(0.0),
        humidity: Some(60.0),
        wind_speed: Some(1.5),
        wind_dir: Some(90.0),
        pressure: Some(1012.0),
        sunshine: Some(0.5),
        condition: Condition::Sunny,
    }
}

/// `count` consecutive hourly observations for one station
pub fn hourly_series(station_id: &str, count: usize) -> Vec<Observation> {
    let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00+08:00").unwrap();
    (0..count)
        .map(|hour| {
            let mut row = observation(station_id, "2026-01-01T00:00:00+08:00", 20.0);
            row.date = start + chrono::Duration::hours(hour as i64);
            row
        })
        .collect()
}

/// CWA response body with the given station blocks
pub fn cwa_body(locations: serde_json::Value) -> String {
    serde_json::json!({
        "success": "true",
        "result": { "resource_id": "C-B0024-001" },
        "records": { "location": locations }
    })
    .to_string()
}

/// One station block in the upstream shape
pub fn cwa_location(station_id: &str, hours: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "station": { "StationID": station_id, "StationName": "Test Station" },
        "stationObsTimes": { "stationObsTime": hours }
    })
}
