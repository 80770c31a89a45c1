use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

/// Coarse weather condition derived from precipitation and humidity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize, ToSchema,
)]
#[sqlx(type_name = "text")]
pub enum Condition {
    #[sqlx(rename = "Sunny")]
    Sunny,
    #[sqlx(rename = "Rainy")]
    Rainy,
    #[sqlx(rename = "Cloudy")]
    Cloudy,
    #[sqlx(rename = "Stormy")]
    Stormy,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "Sunny",
            Condition::Rainy => "Rainy",
            Condition::Cloudy => "Cloudy",
            Condition::Stormy => "Stormy",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Database entity models

/// One normalized hourly reading for a station, keyed by (station_id, date)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Observation {
    pub station_id: String,
    pub date: DateTime<FixedOffset>,
    pub avg_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub precipitation: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_dir: Option<f64>,
    pub pressure: Option<f64>,
    pub sunshine: Option<f64>,
    pub condition: Condition,
}

/// Row filter accepted by the store's select capability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub station_id: Option<String>,
}

impl ObservationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn station(station_id: impl Into<String>) -> Self {
        Self {
            station_id: Some(station_id.into()),
        }
    }
}

/// Sort direction on the `date` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Ascending,
    Descending,
}

// API response DTOs (to avoid circular dependency between services and api modules)

/// Observation as served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationResponse {
    pub station_id: String,
    pub date: DateTime<FixedOffset>,
    pub avg_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub precipitation: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    // The dashboard reads this one in snake case
    #[serde(rename = "wind_dir")]
    pub wind_dir: Option<f64>,
    pub pressure: Option<f64>,
    pub sunshine: Option<f64>,
    pub condition: Condition,
}

impl From<Observation> for ObservationResponse {
    fn from(observation: Observation) -> Self {
        Self {
            station_id: observation.station_id,
            date: observation.date,
            avg_temp: observation.avg_temp,
            min_temp: observation.min_temp,
            max_temp: observation.max_temp,
            precipitation: observation.precipitation,
            humidity: observation.humidity,
            wind_speed: observation.wind_speed,
            wind_dir: observation.wind_dir,
            pressure: observation.pressure,
            sunshine: observation.sunshine,
            condition: observation.condition,
        }
    }
}
