use futures::future::BoxFuture;

use crate::db::{DateOrder, DbError, Observation, ObservationFilter};

/// Columns identifying one observation; re-ingesting the same pair overwrites it
pub const CONFLICT_KEYS: [&str; 2] = ["station_id", "date"];

/// Storage capability the pipeline writes to and the query service reads from
///
/// Implementations must give `upsert` insert-or-overwrite semantics on
/// `conflict_keys` so that overlapping sync cycles stay idempotent.
pub trait ObservationStore: Send + Sync {
    /// Insert or overwrite `rows`, returning the number of rows written
    fn upsert<'a>(
        &'a self,
        rows: &'a [Observation],
        conflict_keys: &'a [&'a str],
    ) -> BoxFuture<'a, Result<u64, DbError>>;

    /// Read at most `limit` rows matching `filter`, sorted on `date`
    fn select<'a>(
        &'a self,
        filter: &'a ObservationFilter,
        order: DateOrder,
        limit: i64,
    ) -> BoxFuture<'a, Result<Vec<Observation>, DbError>>;
}
