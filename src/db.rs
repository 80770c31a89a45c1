pub mod error;
pub mod models;
pub mod observation_repository;
pub mod pool;
pub mod store;

pub use error::DbError;
pub use models::*;
pub use observation_repository::ObservationRepository;
pub use pool::{connect_optional, connect_with_retry};
pub use store::{ObservationStore, CONFLICT_KEYS};
