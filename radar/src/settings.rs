use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{net::SocketAddr, path::Path, time::Duration};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// RUST_LOG compatible settings string. Default to
    /// "radar=debug,db_store=info"
    #[serde(default = "default_log")]
    pub log: String,
    /// Listen address for the ingest http server. Default is 0.0.0.0:8080
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    pub database: db_store::Settings,
    /// How long a device's contact is remembered before it is written again
    /// even when unchanged. (Default is 1 hour)
    #[serde(with = "humantime_serde", default = "default_contact_cache_ttl")]
    pub contact_cache_ttl: Duration,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub exporter: ExporterSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsSettings {
    /// Scrape endpoint for metrics
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: SocketAddr,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            endpoint: default_metrics_endpoint(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExporterSettings {
    /// Run the geolocation exporter alongside the ingest server
    #[serde(default = "default_exporter_enabled")]
    pub enabled: bool,
    /// Max scan records read per batch. (Default is 5000)
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// How long to wait for new scans before polling anyway. (Default is 24 hours)
    #[serde(with = "humantime_serde", default = "default_idle_timeout")]
    pub idle_timeout: Duration,
    /// Quiet period after a wake up so that a burst of scans from one
    /// device lands in a single batch. (Default is 15 seconds)
    #[serde(with = "humantime_serde", default = "default_settle_delay")]
    pub settle_delay: Duration,
    /// Wait after a failed batch before trying again. (Default is 1 minute)
    #[serde(with = "humantime_serde", default = "default_retry_interval")]
    pub retry_interval: Duration,
    /// WiFi access points seen further apart than this are treated as
    /// mobile hotspots and never exported. (Default is 1000 meters)
    #[serde(default = "default_mobility_threshold_meters")]
    pub mobility_threshold_meters: f64,
    /// Geolocation submission endpoint. When absent submissions are only
    /// logged.
    pub sink: Option<SinkSettings>,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            enabled: default_exporter_enabled(),
            batch_limit: default_batch_limit(),
            idle_timeout: default_idle_timeout(),
            settle_delay: default_settle_delay(),
            retry_interval: default_retry_interval(),
            mobility_threshold_meters: default_mobility_threshold_meters(),
            sink: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SinkSettings {
    pub url: String,
    /// Bearer token sent with each submission
    pub token: Option<String>,
    #[serde(with = "humantime_serde", default = "default_sink_timeout")]
    pub timeout: Duration,
}

fn default_log() -> String {
    "radar=debug,db_store=info".to_string()
}

fn default_listen() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_contact_cache_ttl() -> Duration {
    humantime::parse_duration("1 hour").unwrap()
}

fn default_metrics_endpoint() -> SocketAddr {
    "127.0.0.1:19000".parse().unwrap()
}

fn default_exporter_enabled() -> bool {
    true
}

fn default_batch_limit() -> usize {
    5_000
}

fn default_idle_timeout() -> Duration {
    humantime::parse_duration("24 hours").unwrap()
}

fn default_settle_delay() -> Duration {
    humantime::parse_duration("15 seconds").unwrap()
}

fn default_retry_interval() -> Duration {
    humantime::parse_duration("1 minute").unwrap()
}

fn default_mobility_threshold_meters() -> f64 {
    1_000.0
}

fn default_sink_timeout() -> Duration {
    humantime::parse_duration("30 seconds").unwrap()
}

impl Settings {
    /// Load Settings from a given path. Settings are loaded from a given
    /// optional path and can be overridden with environment variables.
    ///
    /// Environment overrides have the same name as the entries in the settings
    /// file in uppercase and prefixed with "RADAR__". For example
    /// "RADAR__DATABASE__URL" will override the data base url.
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(file) = path {
            // Add optional settings file
            builder = builder
                .add_source(File::with_name(&file.as_ref().to_string_lossy()).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix("RADAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .and_then(Self::validate)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.exporter.batch_limit == 0 {
            return Err(ConfigError::Message(
                "exporter.batch_limit must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}
