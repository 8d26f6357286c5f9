//! Exports stored scans to a geolocation API.
//!
//! The exporter reads scan records in modification order, groups them into
//! scan sessions, estimates where the device was during each session and
//! submits one location fix per session. The position in the record stream
//! is persisted after every batch so a restart resumes where it left off.

pub mod cursor;
pub mod mobility;
pub mod position;
pub mod session;
pub mod sink;
pub mod submission;
pub mod wake;

use std::{collections::HashSet, convert::Infallible, sync::Arc};

pub use self::{
    sink::{ExportSink, HttpSink, LogSink, MemorySink},
    submission::Submission,
    wake::WakeSignal,
};

use self::{mobility::MobilityCheck, session::Session};
use crate::{
    error::{DecodeError, ExportError, StoreError},
    scan::{RadioAccessType, ScanRecord},
    settings::ExporterSettings,
    store::{enumerate_after, EnumerateError, ScanCursor, Store},
    telemetry,
};

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("export: {0}")]
    Export(#[from] ExportError),
}

impl From<EnumerateError<Infallible>> for BatchError {
    fn from(err: EnumerateError<Infallible>) -> Self {
        match err {
            EnumerateError::Store(err) => Self::Store(err),
            EnumerateError::Visit { error, .. } => match error {},
        }
    }
}

pub struct Exporter {
    store: Arc<dyn Store>,
    sink: Arc<dyn ExportSink>,
    wake: WakeSignal,
    settings: ExporterSettings,
}

impl Exporter {
    pub fn new(
        store: Arc<dyn Store>,
        sink: Arc<dyn ExportSink>,
        wake: WakeSignal,
        settings: ExporterSettings,
    ) -> Self {
        Self {
            store,
            sink,
            wake,
            settings,
        }
    }

    pub async fn run(self, shutdown: triggered::Listener) -> anyhow::Result<()> {
        tracing::info!("starting exporter");
        let mut cursor = cursor::load(self.store.as_ref()).await;
        tracing::info!(modified_ms = cursor.modified_ms, "export cursor loaded");

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let timeout = match self.export_batch(cursor).await {
                Ok(Some(next)) => {
                    cursor = next;
                    continue;
                }
                Ok(None) => self.settings.idle_timeout,
                Err(err) => {
                    tracing::error!(?err, "export batch failed");
                    telemetry::count_export_failure();
                    self.settings.retry_interval
                }
            };

            tokio::select! {
                _ = shutdown.clone() => break,
                signaled = self.wake.wait(timeout) => {
                    tracing::debug!(signaled, "exporter woke up");
                }
            }
            // let a burst of scans from the same device settle into one batch
            tokio::select! {
                _ = shutdown.clone() => break,
                _ = tokio::time::sleep(self.settings.settle_delay) => (),
            }
        }

        tracing::info!("stopping exporter");
        Ok(())
    }

    /// Exports the next batch of records after `cursor`.
    ///
    /// Returns the advanced cursor, already persisted, or `None` when there
    /// was nothing to export. On error the persisted cursor is unchanged and
    /// the whole batch will be read again.
    pub async fn export_batch(
        &self,
        cursor: ScanCursor,
    ) -> Result<Option<ScanCursor>, BatchError> {
        let mut limit = self.settings.batch_limit.max(1);
        let records = loop {
            let mut records = self.read_batch(cursor, limit).await?;
            if records.len() < limit {
                break records;
            }
            let keep = complete_sessions(&records);
            if keep > 0 {
                records.truncate(keep);
                break records;
            }
            // a single session fills the whole batch
            limit = limit.saturating_mul(2);
        };

        let Some(last) = records.last().map(ScanCursor::of) else {
            return Ok(None);
        };
        let count = records.len();
        telemetry::count_records_read(count as u64);

        let mut mobility = MobilityCheck::new(self.settings.mobility_threshold_meters);
        let mut exported = 0;
        for mut session in session::group_sessions(records) {
            session.dedup_transmitters();
            if self.export_session(&session, &mut mobility).await? {
                exported += 1;
            }
        }

        cursor::save(self.store.as_ref(), last).await?;
        telemetry::export_cursor(last.modified_ms);
        tracing::info!(
            records = count,
            sessions = exported,
            modified_ms = last.modified_ms,
            "exported batch"
        );
        Ok(Some(last))
    }

    async fn read_batch(
        &self,
        cursor: ScanCursor,
        limit: usize,
    ) -> Result<Vec<ScanRecord>, BatchError> {
        let mut records = vec![];
        enumerate_after(self.store.as_ref(), cursor, limit, |record| {
            records.push(record);
            Ok::<_, Infallible>(())
        })
        .await?;
        Ok(records)
    }

    async fn export_session(
        &self,
        session: &Session,
        mobility: &mut MobilityCheck,
    ) -> Result<bool, BatchError> {
        let estimate = match position::estimate(session.first()) {
            Ok(estimate) => estimate,
            Err(err) => {
                tracing::warn!(
                    source_id = session.source_id(),
                    session_id = session.session_id(),
                    records = session.records.len(),
                    %err,
                    "skipping session that cannot be placed"
                );
                let reason = match err {
                    DecodeError::Location(_) => "location",
                    _ => "time",
                };
                telemetry::count_session_skipped(reason);
                return Ok(false);
            }
        };

        let mut retained: Vec<&ScanRecord> = Vec::with_capacity(session.records.len());
        for record in &session.records {
            if record.scan.rat == RadioAccessType::Wifi
                && mobility
                    .is_mobile(self.store.as_ref(), &record.scan.transmitter_id)
                    .await?
            {
                telemetry::count_mobile_transmitter();
                continue;
            }
            retained.push(record);
        }
        if retained.is_empty() {
            telemetry::count_session_skipped("no_transmitters");
            return Ok(false);
        }

        let submission = Submission::new(&estimate, retained);
        self.sink.submit(&submission).await?;
        telemetry::count_session_exported();
        tracing::debug!(
            source_id = session.source_id(),
            session_id = session.session_id(),
            cells = submission.cells.len(),
            wifi = submission.wifi.len(),
            "exported session"
        );
        Ok(true)
    }
}

/// Number of leading records, in modification order, that form whole
/// sessions. A full batch may end part way through a session; every session
/// with a record at or past the cut is left for the next batch.
fn complete_sessions(records: &[ScanRecord]) -> usize {
    let Some(last) = records.last() else {
        return 0;
    };
    let mut held = HashSet::from([last.session_key()]);
    let mut cut = records.len();
    loop {
        let first = records
            .iter()
            .position(|record| held.contains(&record.session_key()))
            .unwrap_or(cut);
        if first >= cut {
            return cut;
        }
        held.extend(records[first..cut].iter().map(ScanRecord::session_key));
        cut = first;
    }
}
