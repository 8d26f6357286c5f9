use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use udp_proxy::{
    lookup::ApiServer,
    relay::{self, Relay},
    telemetry, Settings,
};

#[derive(Debug, clap::Parser)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(about = "UDP to HTTP relay for notehub targets")]
pub struct Cli {
    /// Optional configuration file to use. If present the toml file at the
    /// given path will be loaded. Environment variables can override the
    /// settings in the given file.
    #[clap(short = 'c')]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Cmd,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let settings = Settings::new(self.config)?;
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(&settings.log))
            .with(tracing_subscriber::fmt::layer())
            .init();
        self.cmd.run(settings).await
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Cmd {
    Server(Server),
}

impl Cmd {
    pub async fn run(&self, settings: Settings) -> Result<()> {
        match self {
            Self::Server(cmd) => cmd.run(&settings).await,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct Server {}

impl Server {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        telemetry::start_metrics(&settings.metrics)?;

        // configure shutdown trigger
        let (shutdown_trigger, shutdown) = triggered::trigger();
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => shutdown_trigger.trigger(),
                _ = signal::ctrl_c() => shutdown_trigger.trigger(),
            }
        });

        if settings.targets.is_empty() {
            tracing::warn!("no targets configured");
        }

        let client = relay::http_client(settings.timeout)?;
        let mut relays = Vec::with_capacity(settings.targets.len());
        for target in &settings.targets {
            let addr = settings.udp_addr(target);
            let relay = Relay::bind(
                addr,
                target.target.clone(),
                target.upstream_url(&settings.upstream_scheme),
                client.clone(),
            )
            .await
            .with_context(|| format!("binding udp {addr} for {}", target.target))?;
            relays.push(relay.run(shutdown.clone()));
        }

        let api_server = ApiServer::new(settings.listen, &settings.targets);

        tokio::try_join!(
            api_server.run(shutdown.clone()),
            futures::future::try_join_all(relays),
        )?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
