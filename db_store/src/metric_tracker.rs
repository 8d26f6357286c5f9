use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};

use crate::{Error, Result};

const DURATION: Duration = Duration::from_secs(300);

/// Periodically publish pool size and idle connection gauges until shutdown.
pub fn start(
    app_name: &str,
    pool: sqlx::Pool<sqlx::Postgres>,
    shutdown: triggered::Listener,
) -> BoxFuture<'static, Result> {
    let pool_size_name = format!("{app_name}_db_pool_size");
    let pool_idle_name = format!("{app_name}_db_pool_idle");
    let join_handle =
        tokio::spawn(async move { run(pool_size_name, pool_idle_name, pool, shutdown).await });

    join_handle.map(|result| result.map_err(Error::from)).boxed()
}

async fn run(
    size_name: String,
    idle_name: String,
    pool: sqlx::Pool<sqlx::Postgres>,
    shutdown: triggered::Listener,
) {
    let mut trigger = tokio::time::interval(DURATION);

    loop {
        tokio::select! {
            _ = shutdown.clone() => {
                tracing::info!("db_store: MetricTracker shutting down");
                break;
            }
            _ = trigger.tick() => {
                metrics::gauge!(size_name.clone()).set(pool.size() as f64);
                metrics::gauge!(idle_name.clone()).set(pool.num_idle() as f64);
            }
        }
    }
}
