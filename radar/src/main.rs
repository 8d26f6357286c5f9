use anyhow::{Error, Result};
use clap::Parser;
use futures_util::TryFutureExt;
use radar::{
    exporter::{ExportSink, Exporter, HttpSink, LogSink, WakeSignal},
    ingest::{ApiServer, IngestState},
    store::{PgStore, Store},
    telemetry, Settings,
};
use std::{path::PathBuf, sync::Arc};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, clap::Parser)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(about = "Radar Scan Ingest and Geolocation Export Server")]
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
    /// Run the ingest server and the exporter
    Server(Server),
    /// Apply database migrations and exit
    Migrate,
}

impl Cmd {
    pub async fn run(&self, settings: Settings) -> Result<()> {
        match self {
            Self::Server(cmd) => cmd.run(&settings).await,
            Self::Migrate => {
                let pool = settings.database.connect(2).await?;
                PgStore::new(pool).migrate().await?;
                tracing::info!("migrations applied");
                Ok(())
            }
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct Server {}

impl Server {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        // Install the prometheus metrics exporter
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

        // Set up the postgres pool:
        let pool = settings.database.connect(10).await?;
        let pg_store = PgStore::new(pool.clone());
        pg_store.migrate().await?;
        let store: Arc<dyn Store> = Arc::new(pg_store);

        let wake = WakeSignal::new();
        let api_server = ApiServer::new(
            settings.listen,
            IngestState::new(store.clone(), wake.clone(), settings.contact_cache_ttl),
        );

        let exporter_settings = settings.exporter.clone();
        let exporter = if exporter_settings.enabled {
            let sink: Arc<dyn ExportSink> = match &exporter_settings.sink {
                Some(sink) => Arc::new(HttpSink::new(sink)?),
                None => {
                    tracing::warn!("no geolocation sink configured, logging submissions");
                    Arc::new(LogSink)
                }
            };
            Some(Exporter::new(store, sink, wake, exporter_settings))
        } else {
            tracing::info!("exporter disabled");
            None
        };

        let pool_metrics = db_store::metric_tracker::start(
            env!("CARGO_PKG_NAME"),
            pool.clone(),
            shutdown.clone(),
        );

        tokio::try_join!(
            api_server.run(shutdown.clone()),
            async {
                match exporter {
                    Some(exporter) => exporter.run(shutdown.clone()).await,
                    None => Ok(()),
                }
            },
            pool_metrics.map_err(Error::from),
        )?;

        pool.close().await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
