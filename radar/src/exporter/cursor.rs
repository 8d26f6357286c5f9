use db_store::state;
use serde::{Deserialize, Serialize};

use crate::{
    error::StoreError,
    store::{ScanCursor, Store},
};

pub const EXPORT_STATE_KEY: &str = "geolocation_export";

/// Persisted form of the export cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportState {
    pub last_modified_ms: i64,
    /// Absent in state written before serials were tracked, in which case
    /// the whole millisecond counts as exported.
    #[serde(default = "last_serial_default")]
    pub last_serial: i64,
}

fn last_serial_default() -> i64 {
    i64::MAX
}

impl From<ExportState> for ScanCursor {
    fn from(state: ExportState) -> Self {
        Self {
            modified_ms: state.last_modified_ms,
            serial: state.last_serial,
        }
    }
}

impl From<ScanCursor> for ExportState {
    fn from(cursor: ScanCursor) -> Self {
        Self {
            last_modified_ms: cursor.modified_ms,
            last_serial: cursor.serial,
        }
    }
}

/// Reads the export cursor. Missing or unreadable state starts the export
/// from the beginning.
pub async fn load(store: &dyn Store) -> ScanCursor {
    match store.get_state(EXPORT_STATE_KEY).await {
        Ok(Some(value)) => match state::decode::<ExportState>(EXPORT_STATE_KEY, value) {
            Ok(state) => state.into(),
            Err(err) => {
                tracing::warn!(%err, "ignoring undecodable export state");
                ScanCursor::default()
            }
        },
        Ok(None) => ScanCursor::default(),
        Err(err) => {
            tracing::warn!(?err, "failed to read export state");
            ScanCursor::default()
        }
    }
}

pub async fn save(store: &dyn Store, cursor: ScanCursor) -> Result<(), StoreError> {
    let value = state::encode(EXPORT_STATE_KEY, &ExportState::from(cursor))?;
    store.set_state(EXPORT_STATE_KEY, &value).await
}
