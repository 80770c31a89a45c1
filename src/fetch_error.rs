#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Upstream rejected the request: {0}")]
    Rejected(String),
}
