use metrics_exporter_prometheus::PrometheusBuilder;

use crate::settings::MetricsSettings;

const DATAGRAMS_RECEIVED: &str = concat!(env!("CARGO_PKG_NAME"), "_", "datagrams_received");
const REPLIES_SENT: &str = concat!(env!("CARGO_PKG_NAME"), "_", "replies_sent");
const RELAY_FAILURES: &str = concat!(env!("CARGO_PKG_NAME"), "_", "relay_failures");

pub fn start_metrics(settings: &MetricsSettings) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(settings.endpoint)
        .install()?;
    Ok(())
}

pub fn count_datagram(target: &str) {
    metrics::counter!(DATAGRAMS_RECEIVED, "target" => target.to_string()).increment(1);
}

pub fn count_reply(target: &str) {
    metrics::counter!(REPLIES_SENT, "target" => target.to_string()).increment(1);
}

pub fn count_failure(target: &str) {
    metrics::counter!(RELAY_FAILURES, "target" => target.to_string()).increment(1);
}
