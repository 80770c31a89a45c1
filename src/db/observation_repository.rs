use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument};

use crate::db::{DateOrder, DbError, Observation, ObservationFilter, ObservationStore};

/// Every column of `weather_data` the pipeline writes, in insert order
pub const OBSERVATION_COLUMNS: [&str; 12] = [
    "station_id",
    "date",
    "avg_temp",
    "min_temp",
    "max_temp",
    "precipitation",
    "humidity",
    "wind_speed",
    "wind_dir",
    "pressure",
    "sunshine",
    "condition",
];

#[derive(Clone)]
pub struct ObservationRepository {
    pool: PgPool,
}

impl ObservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a batch of observations in a single statement
    ///
    /// Conflict keys are interpolated into the statement, so only known
    /// column names are accepted. Rows sharing a key within one batch are
    /// rejected by Postgres; callers de-duplicate before writing.
    #[instrument(skip(self, rows), fields(count = rows.len(), conflict_keys = ?conflict_keys))]
    pub async fn upsert_observations(
        &self,
        rows: &[Observation],
        conflict_keys: &[&str],
    ) -> Result<u64, DbError> {
        validate_conflict_keys(conflict_keys)?;

        if rows.is_empty() {
            debug!("No observations to upsert");
            return Ok(0);
        }

        let mut builder = upsert_statement(rows, conflict_keys);
        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            error!(rows = rows.len(), error = %e, "Failed to upsert observations");
            e
        })?;

        debug!("Upserted {} observations", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Most relevant rows first, capped at `limit`
    #[instrument(skip(self))]
    pub async fn find_observations(
        &self,
        filter: &ObservationFilter,
        order: DateOrder,
        limit: i64,
    ) -> Result<Vec<Observation>, DbError> {
        debug!("Querying observations with {:?}, order={:?}, limit={}", filter, order, limit);

        let mut builder = select_statement(filter, order, limit);
        let observations = builder
            .build_query_as::<Observation>()
            .fetch_all(&self.pool)
            .await?;

        info!("Found {} observations", observations.len());
        Ok(observations)
    }
}

impl ObservationStore for ObservationRepository {
    fn upsert<'a>(
        &'a self,
        rows: &'a [Observation],
        conflict_keys: &'a [&'a str],
    ) -> BoxFuture<'a, Result<u64, DbError>> {
        Box::pin(self.upsert_observations(rows, conflict_keys))
    }

    fn select<'a>(
        &'a self,
        filter: &'a ObservationFilter,
        order: DateOrder,
        limit: i64,
    ) -> BoxFuture<'a, Result<Vec<Observation>, DbError>> {
        Box::pin(self.find_observations(filter, order, limit))
    }
}

fn validate_conflict_keys(conflict_keys: &[&str]) -> Result<(), DbError> {
    if conflict_keys.is_empty() {
        return Err(DbError::UnsupportedConflictKey(String::new()));
    }
    match conflict_keys
        .iter()
        .find(|key| !OBSERVATION_COLUMNS.contains(*key))
    {
        Some(key) => Err(DbError::UnsupportedConflictKey((*key).to_string())),
        None => Ok(()),
    }
}

fn upsert_statement<'a>(
    rows: &'a [Observation],
    conflict_keys: &[&str],
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO weather_data ({}) ",
        OBSERVATION_COLUMNS.join(", ")
    ));

    builder.push_values(rows, |mut b, row| {
        b.push_bind(&row.station_id)
            .push_bind(row.date)
            .push_bind(row.avg_temp)
            .push_bind(row.min_temp)
            .push_bind(row.max_temp)
            .push_bind(row.precipitation)
            .push_bind(row.humidity)
            .push_bind(row.wind_speed)
            .push_bind(row.wind_dir)
            .push_bind(row.pressure)
            .push_bind(row.sunshine)
            .push_bind(row.condition);
    });

    let updates = OBSERVATION_COLUMNS
        .iter()
        .filter(|column| !conflict_keys.contains(*column))
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .chain(std::iter::once("updated_at = NOW()".to_string()))
        .collect::<Vec<_>>()
        .join(", ");

    builder.push(format!(
        " ON CONFLICT ({}) DO UPDATE SET {updates}",
        conflict_keys.join(", ")
    ));
    builder
}

fn select_statement<'a>(
    filter: &'a ObservationFilter,
    order: DateOrder,
    limit: i64,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM weather_data",
        OBSERVATION_COLUMNS.join(", ")
    ));

    if let Some(station_id) = &filter.station_id {
        builder.push(" WHERE station_id = ").push_bind(station_id);
    }

    builder.push(match order {
        DateOrder::Ascending => " ORDER BY date ASC, station_id ASC",
        DateOrder::Descending => " ORDER BY date DESC, station_id ASC",
    });
    builder.push(" LIMIT ").push_bind(limit);
    builder
}
