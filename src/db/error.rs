#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Unsupported conflict key: {0}")]
    UnsupportedConflictKey(String),
}
