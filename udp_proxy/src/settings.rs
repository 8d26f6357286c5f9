use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// RUST_LOG compatible settings string. Default to
    /// "udp_proxy=debug"
    #[serde(default = "default_log")]
    pub log: String,
    /// Listen address for the target lookup endpoint. Default "0.0.0.0:8080"
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Local address the UDP listeners bind to. Default "0.0.0.0"
    #[serde(default = "default_udp_bind")]
    pub udp_bind: IpAddr,
    /// Scheme used to reach each target. Default "https"
    #[serde(default = "default_upstream_scheme")]
    pub upstream_scheme: String,
    /// Timeout of a single upstream request. Default 30 seconds
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub targets: Vec<TargetSettings>,
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

/// An upstream host and path, together with the UDP address devices are
/// told to use instead.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TargetSettings {
    /// Host and path without scheme, e.g. "api.notefile.net/udp"
    pub target: String,
    /// Public address of this proxy as advertised to devices
    pub udp_ipv4: Ipv4Addr,
    pub udp_port: u16,
}

impl TargetSettings {
    pub fn upstream_url(&self, scheme: &str) -> String {
        format!("{scheme}://{}", self.target)
    }
}

fn default_log() -> String {
    "udp_proxy=debug".to_string()
}

fn default_listen() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_udp_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_upstream_scheme() -> String {
    "https".to_string()
}

fn default_timeout() -> Duration {
    humantime::parse_duration("30 seconds").unwrap()
}

fn default_metrics_endpoint() -> SocketAddr {
    "127.0.0.1:19001".parse().unwrap()
}

impl Settings {
    /// Load Settings from a given path. Settings are loaded from a given
    /// optional path and can be overridden with environment variables.
    ///
    /// Environment overrides have the same name as the entries in the settings
    /// file in uppercase and prefixed with "UDP_PROXY__". For example
    /// "UDP_PROXY__UPSTREAM_SCHEME" will override the upstream scheme.
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(file) = path {
            // Add optional settings file
            builder = builder
                .add_source(File::with_name(&file.as_ref().to_string_lossy()).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix("UDP_PROXY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
    }

    pub fn udp_addr(&self, target: &TargetSettings) -> SocketAddr {
        SocketAddr::new(self.udp_bind, target.udp_port)
    }
}
