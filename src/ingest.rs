//! Decoding of CWA station observation payloads into canonical rows
//!
//! The upstream dataset delivers one block per station with hourly elements
//! whose values arrive as strings, numbers, or not at all. This module turns
//! them into [`Observation`](crate::db::Observation) values.

pub mod classifier;
pub mod normalizer;
pub mod payload;
pub mod record_builder;

pub use classifier::classify;
pub use normalizer::{parse_value, parse_wind_dir, SENTINEL_FLOOR};
pub use payload::{CwaResponse, HourlyElement, RawField, RawLocation, WeatherElements};
pub use record_builder::build_observations;
