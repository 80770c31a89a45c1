use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::{DateOrder, ObservationFilter, ObservationResponse, ObservationStore};
use crate::services::ServiceError;

/// Rows returned per query: 30 days of hourly readings for one station
pub const QUERY_ROW_LIMIT: i64 = 720;

#[derive(Clone)]
pub struct WeatherService {
    store: Option<Arc<dyn ObservationStore>>,
}

impl WeatherService {
    pub fn new(store: Option<Arc<dyn ObservationStore>>) -> Self {
        Self { store }
    }

    /// Newest observations first, for one station or across all of them
    ///
    /// A blank `station_id` is the same as none.
    #[instrument(skip(self))]
    pub async fn get_weather(
        &self,
        station_id: Option<&str>,
    ) -> Result<Vec<ObservationResponse>, ServiceError> {
        let store = self
            .store
            .as_ref()
            .ok_or(ServiceError::Configuration("observation store"))?;

        let filter = match station_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => ObservationFilter::station(id),
            None => ObservationFilter::all(),
        };

        let observations = store
            .select(&filter, DateOrder::Descending, QUERY_ROW_LIMIT)
            .await?;
        debug!("Retrieved {} observations", observations.len());

        Ok(observations
            .into_iter()
            .map(ObservationResponse::from)
            .collect())
    }
}
