use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument};

use crate::fetch_error::FetchError;
use crate::ingest::{CwaResponse, RawLocation};

/// Hourly automatic-station observations, last 30 days
pub const DEFAULT_CWA_API_URL: &str =
    "https://opendata.cwa.gov.tw/api/v1/rest/datastore/C-B0024-001";

/// Length of the trailing window requested on every sync
pub const WINDOW_DAYS: i64 = 30;

/// The API interprets `timeFrom`/`timeTo` as Taiwan wall-clock time (UTC+8)
pub const SOURCE_UTC_OFFSET_HOURS: i64 = 8;

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(60);

/// Longest slice of an error body kept in a [`FetchError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Trailing observation window, expressed in the upstream's local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    pub time_from: NaiveDateTime,
    pub time_to: NaiveDateTime,
}

impl ObservationWindow {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let time_to = now.naive_utc() + Duration::hours(SOURCE_UTC_OFFSET_HOURS);
        let time_from = time_to - Duration::days(WINDOW_DAYS);
        Self { time_from, time_to }
    }

    pub fn time_from_param(&self) -> String {
        format_param(self.time_from)
    }

    pub fn time_to_param(&self) -> String {
        format_param(self.time_to)
    }
}

/// Second precision, no fraction and no zone suffix
fn format_param(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[derive(Clone)]
pub struct CwaFetcher {
    client: reqwest::Client,
    url: String,
}

impl CwaFetcher {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Fetch every station block for `window`
    ///
    /// Transport errors, non-2xx statuses, undecodable bodies and in-band
    /// rejections are all returned as errors; the caller decides what to do.
    #[instrument(skip(self, credential), fields(url = %self.url, time_to = %window.time_to))]
    pub async fn fetch_locations(
        &self,
        credential: &str,
        window: &ObservationWindow,
    ) -> Result<Vec<RawLocation>, FetchError> {
        let time_from = window.time_from_param();
        let time_to = window.time_to_param();

        debug!("Requesting observations from {} to {}", time_from, time_to);
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("Authorization", credential),
                ("format", "JSON"),
                ("timeFrom", time_from.as_str()),
                ("timeTo", time_to.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Upstream returned {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        debug!("Retrieved payload, size: {} bytes", body.len());

        let locations = parse_payload(&body)?;
        info!("Fetched {} station blocks", locations.len());
        Ok(locations)
    }
}

fn parse_payload(body: &str) -> Result<Vec<RawLocation>, FetchError> {
    let response: CwaResponse = serde_json::from_str(body)?;

    if response.is_rejected() {
        let message = response
            .result
            .as_ref()
            .and_then(|result| result.get("message"))
            .and_then(|message| message.as_str())
            .unwrap_or("no message")
            .to_string();
        return Err(FetchError::Rejected(message));
    }

    Ok(response.into_locations())
}
