use std::{
    collections::{BTreeSet, HashMap},
    sync::{Mutex, MutexGuard},
};

use futures::{stream::BoxStream, StreamExt};

use super::{ScanCursor, Store};
use crate::{
    contact::Contact,
    error::StoreError,
    scan::{Scan, ScanRecord},
    track::Track,
};

/// In-process [`Store`] used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    scans: Vec<ScanRecord>,
    tracks: Vec<(String, Track)>,
    contacts: HashMap<String, Contact>,
    state: HashMap<String, serde_json::Value>,
    next_serial: i64,
    unavailable: bool,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn available(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self.lock();
        if inner.unavailable {
            return Err(StoreError::Sql(sqlx::Error::PoolTimedOut));
        }
        Ok(inner)
    }

    /// Insert a scan with an explicit modification time.
    pub async fn insert_scan_at(&self, source_id: &str, scan: &Scan, modified_ms: i64) {
        let mut inner = self.lock();
        inner.next_serial += 1;
        let record = ScanRecord {
            serial: inner.next_serial,
            modified_ms,
            source_id: source_id.to_string(),
            scan: scan.clone(),
        };
        inner.scans.push(record);
    }

    /// Make every operation fail as if the database went away.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn scans(&self) -> Vec<ScanRecord> {
        self.lock().scans.clone()
    }

    pub fn tracks(&self) -> Vec<(String, Track)> {
        self.lock().tracks.clone()
    }

    pub fn contact(&self, device_uid: &str) -> Option<Contact> {
        self.lock().contacts.get(device_uid).cloned()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn insert_scan(&self, source_id: &str, scan: &Scan) -> Result<(), StoreError> {
        self.available()?;
        let now = chrono::Utc::now().timestamp_millis();
        self.insert_scan_at(source_id, scan, now).await;
        Ok(())
    }

    async fn insert_track(&self, source_id: &str, track: &Track) -> Result<(), StoreError> {
        self.available()?
            .tracks
            .push((source_id.to_string(), track.clone()));
        Ok(())
    }

    async fn upsert_contact(&self, contact: &Contact) -> Result<(), StoreError> {
        self.available()?
            .contacts
            .insert(contact.device_uid.clone(), contact.clone());
        Ok(())
    }

    fn scans_after(
        &self,
        cursor: ScanCursor,
        limit: usize,
    ) -> BoxStream<'_, Result<ScanRecord, StoreError>> {
        let records = match self.available() {
            Ok(inner) => {
                let mut records: Vec<ScanRecord> = inner
                    .scans
                    .iter()
                    .filter(|record| ScanCursor::of(record) > cursor)
                    .cloned()
                    .collect();
                records.sort_by_key(ScanCursor::of);
                records.truncate(limit);
                records.into_iter().map(Ok).collect()
            }
            Err(err) => vec![Err(err)],
        };
        futures::stream::iter(records).boxed()
    }

    async fn sighting_locations(&self, transmitter_id: &str) -> Result<Vec<String>, StoreError> {
        let locations: BTreeSet<String> = self
            .available()?
            .scans
            .iter()
            .filter(|record| record.scan.transmitter_id == transmitter_id)
            .filter(|record| !record.scan.began_loc.is_empty())
            .map(|record| record.scan.began_loc.clone())
            .collect();
        Ok(locations.into_iter().collect())
    }

    async fn get_state(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.available()?.state.get(key).cloned())
    }

    async fn set_state(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.available()?
            .state
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
