use crate::db::DbError;
use crate::fetch_error::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not configured: {0}")]
    Configuration(&'static str),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] DbError),
}
