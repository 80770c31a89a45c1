use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Top-level response of the `C-B0024-001` datastore endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CwaResponse {
    pub success: Option<serde_json::Value>,
    pub result: Option<serde_json::Value>,
    pub records: Option<Records>,
}

impl CwaResponse {
    /// Station blocks in the order the API returned them
    pub fn into_locations(self) -> Vec<RawLocation> {
        self.records
            .and_then(|records| records.location)
            .unwrap_or_default()
    }

    /// The API reports some failures in-band with `"success": "false"`
    pub fn is_rejected(&self) -> bool {
        match &self.success {
            Some(serde_json::Value::String(flag)) => flag.trim().eq_ignore_ascii_case("false"),
            Some(serde_json::Value::Bool(flag)) => !flag,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Records {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub location: Option<Vec<RawLocation>>,
}

/// One station's hourly readings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    pub station: Option<RawStation>,
    #[serde(rename = "stationId")]
    pub station_id: Option<RawField>,
    #[serde(rename = "stationObsTimes")]
    pub station_obs_times: Option<StationObsTimes>,
}

impl RawLocation {
    /// `station.StationID` wins over the flat `stationId` field
    pub fn resolve_station_id(&self) -> Option<String> {
        let nested = self
            .station
            .as_ref()
            .and_then(|station| station.station_id.as_ref());

        nested
            .into_iter()
            .chain(self.station_id.as_ref())
            .find_map(RawField::identifier)
    }

    pub fn hourly_elements(&self) -> &[HourlyElement] {
        self.station_obs_times
            .as_ref()
            .and_then(|times| times.station_obs_time.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStation {
    #[serde(rename = "StationID")]
    pub station_id: Option<RawField>,
    #[serde(rename = "StationName")]
    pub station_name: Option<RawField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationObsTimes {
    #[serde(
        rename = "stationObsTime",
        default,
        deserialize_with = "skip_malformed"
    )]
    pub station_obs_time: Option<Vec<HourlyElement>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyElement {
    #[serde(rename = "DateTime")]
    pub date_time: Option<RawField>,
    #[serde(rename = "weatherElements")]
    pub weather_elements: Option<WeatherElements>,
}

/// Decode a list entry by entry, dropping entries of the wrong shape
///
/// One malformed station block or hour must not discard the whole response.
fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;

    Ok(entries.map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("Skipping malformed entry {}: {}", index, e);
                    None
                }
            })
            .collect()
    }))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeatherElements {
    pub relative_humidity: Option<RawField>,
    pub precipitation: Option<RawField>,
    pub wind_speed: Option<RawField>,
    pub wind_direction: Option<RawField>,
    pub air_pressure: Option<RawField>,
    pub air_temperature: Option<RawField>,
    pub sunshine_duration: Option<RawField>,
}

/// A single element value as it appears on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawField {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawField::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Identifier form of the value; numeric ids arrive as plain JSON numbers
    pub fn identifier(&self) -> Option<String> {
        match self {
            RawField::Text(text) => Some(text.trim().to_string()).filter(|id| !id.is_empty()),
            RawField::Number(value) if value.is_finite() => Some(value.to_string()),
            _ => None,
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}
