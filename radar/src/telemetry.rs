use metrics_exporter_prometheus::PrometheusBuilder;

use crate::settings::MetricsSettings;

const SCANS_INGESTED: &str = concat!(env!("CARGO_PKG_NAME"), "_", "scans_ingested");
const TRACKS_INGESTED: &str = concat!(env!("CARGO_PKG_NAME"), "_", "tracks_ingested");
const INGEST_REJECTED: &str = concat!(env!("CARGO_PKG_NAME"), "_", "ingest_rejected");
const RECORDS_READ: &str = concat!(env!("CARGO_PKG_NAME"), "_", "export_records_read");
const SESSIONS_EXPORTED: &str = concat!(env!("CARGO_PKG_NAME"), "_", "sessions_exported");
const SESSIONS_SKIPPED: &str = concat!(env!("CARGO_PKG_NAME"), "_", "sessions_skipped");
const MOBILE_TRANSMITTERS: &str =
    concat!(env!("CARGO_PKG_NAME"), "_", "mobile_transmitters_excluded");
const EXPORT_FAILURES: &str = concat!(env!("CARGO_PKG_NAME"), "_", "export_failures");
const EXPORT_CURSOR: &str = concat!(env!("CARGO_PKG_NAME"), "_", "export_cursor_ms");

/// Install the Prometheus scrape endpoint
pub fn start_metrics(settings: &MetricsSettings) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(settings.endpoint)
        .install()?;
    tracing::info!(endpoint = %settings.endpoint, "metrics scrape endpoint listening");
    Ok(())
}

pub fn count_scan_ingested() {
    metrics::counter!(SCANS_INGESTED).increment(1);
}

pub fn count_track_ingested() {
    metrics::counter!(TRACKS_INGESTED).increment(1);
}

pub fn count_ingest_rejected(reason: &'static str) {
    metrics::counter!(INGEST_REJECTED, "reason" => reason).increment(1);
}

pub fn count_records_read(count: u64) {
    metrics::counter!(RECORDS_READ).increment(count);
}

pub fn count_session_exported() {
    metrics::counter!(SESSIONS_EXPORTED).increment(1);
}

pub fn count_session_skipped(reason: &'static str) {
    metrics::counter!(SESSIONS_SKIPPED, "reason" => reason).increment(1);
}

pub fn count_mobile_transmitter() {
    metrics::counter!(MOBILE_TRANSMITTERS).increment(1);
}

pub fn count_export_failure() {
    metrics::counter!(EXPORT_FAILURES).increment(1);
}

pub fn export_cursor(modified_ms: i64) {
    metrics::gauge!(EXPORT_CURSOR).set(modified_ms as f64);
}
