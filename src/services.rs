pub mod batch_writer;
pub mod error;
pub mod ingest_service;
pub mod weather_service;

pub use batch_writer::{BatchWriter, WriteReport};
pub use error::ServiceError;
pub use ingest_service::{IngestService, SkipReason, SyncReport};
pub use weather_service::WeatherService;
