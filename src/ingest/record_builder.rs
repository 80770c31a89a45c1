use chrono::DateTime;
use tracing::{debug, instrument, warn};

use crate::db::Observation;
use crate::ingest::{classify, parse_value, parse_wind_dir, HourlyElement, RawField, RawLocation};

/// Build one observation per usable hourly element of a station block
///
/// Elements without a timestamp or without a `weatherElements` mapping are
/// skipped, as are timestamps that are not RFC 3339. Output keeps input order.
#[instrument(skip(location), fields(hours = location.hourly_elements().len()))]
pub fn build_observations(station_id: &str, location: &RawLocation) -> Vec<Observation> {
    let mut observations = Vec::new();
    let mut skipped = 0;

    for element in location.hourly_elements() {
        match build_observation(station_id, element) {
            Some(observation) => observations.push(observation),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(
            "Skipped {} of {} hourly elements for station {}",
            skipped,
            location.hourly_elements().len(),
            station_id
        );
    }

    observations
}

fn build_observation(station_id: &str, element: &HourlyElement) -> Option<Observation> {
    let date_time = element.date_time.as_ref().and_then(RawField::as_text)?;
    let elements = element.weather_elements.as_ref()?;

    let date = match DateTime::parse_from_rfc3339(date_time.trim()) {
        Ok(date) => date,
        Err(e) => {
            warn!(
                "Skipping element with unparseable DateTime '{}' for station {}: {}",
                date_time, station_id, e
            );
            return None;
        }
    };

    let humidity = parse_value(elements.relative_humidity.as_ref());
    let precipitation = parse_value(elements.precipitation.as_ref());
    let temperature = parse_value(elements.air_temperature.as_ref());

    // One hourly temperature; min/max only differ once a daily source exists
    Some(Observation {
        station_id: station_id.to_string(),
        date,
        avg_temp: temperature,
        min_temp: temperature,
        max_temp: temperature,
        precipitation,
        humidity,
        wind_speed: parse_value(elements.wind_speed.as_ref()),
        wind_dir: parse_wind_dir(elements.wind_direction.as_ref()),
        pressure: parse_value(elements.air_pressure.as_ref()),
        sunshine: parse_value(elements.sunshine_duration.as_ref()),
        condition: classify(precipitation, humidity),
    })
}
