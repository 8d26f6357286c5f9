//! Persistence of scans, tracks, contacts and service state.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use futures::{stream::BoxStream, TryStreamExt};

use crate::{
    contact::Contact,
    error::StoreError,
    scan::{Scan, ScanRecord},
    track::Track,
};

/// Position in the stream of scan records, ordered by modification time and
/// then by serial. A cursor names the last record already seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanCursor {
    pub modified_ms: i64,
    pub serial: i64,
}

impl ScanCursor {
    /// A cursor past every record modified at or before `modified_ms`.
    pub fn at(modified_ms: i64) -> Self {
        Self {
            modified_ms,
            serial: i64::MAX,
        }
    }

    pub fn of(record: &ScanRecord) -> Self {
        Self {
            modified_ms: record.modified_ms,
            serial: record.serial,
        }
    }
}

#[async_trait::async_trait]
pub trait Store: Send + Sync + 'static {
    async fn insert_scan(&self, source_id: &str, scan: &Scan) -> Result<(), StoreError>;

    async fn insert_track(&self, source_id: &str, track: &Track) -> Result<(), StoreError>;

    async fn upsert_contact(&self, contact: &Contact) -> Result<(), StoreError>;

    /// Up to `limit` scan records strictly after `cursor`, ascending.
    fn scans_after(
        &self,
        cursor: ScanCursor,
        limit: usize,
    ) -> BoxStream<'_, Result<ScanRecord, StoreError>>;

    /// Distinct start locations of every stored sighting of a transmitter.
    async fn sighting_locations(&self, transmitter_id: &str) -> Result<Vec<String>, StoreError>;

    async fn get_state(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    async fn set_state(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum EnumerateError<E> {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("visit failed after {visited} records: {error}")]
    Visit { visited: usize, error: E },
}

/// Calls `visit` once per scan record after `cursor`, in ascending
/// modification order, until `limit` records were visited or the store has
/// no more. The first error returned by `visit` stops the enumeration.
///
/// Returns the number of records visited.
pub async fn enumerate_after<F, E>(
    store: &dyn Store,
    cursor: ScanCursor,
    limit: usize,
    mut visit: F,
) -> Result<usize, EnumerateError<E>>
where
    F: FnMut(ScanRecord) -> Result<(), E>,
{
    let mut records = store.scans_after(cursor, limit);
    let mut visited = 0;
    while let Some(record) = records.try_next().await? {
        if visited == limit {
            break;
        }
        visit(record).map_err(|error| EnumerateError::Visit { visited, error })?;
        visited += 1;
    }
    Ok(visited)
}

/// [`enumerate_after`] for every record modified after `modified_ms`.
pub async fn enumerate_since<F, E>(
    store: &dyn Store,
    modified_ms: i64,
    limit: usize,
    visit: F,
) -> Result<usize, EnumerateError<E>>
where
    F: FnMut(ScanRecord) -> Result<(), E>,
{
    enumerate_after(store, ScanCursor::at(modified_ms), limit, visit).await
}
