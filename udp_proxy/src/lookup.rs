//! Tells devices which UDP address serves a given HTTP target.

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::settings::TargetSettings;

type Targets = Arc<HashMap<String, TargetSettings>>;

pub fn router(targets: &[TargetSettings]) -> Router {
    let targets: Targets = Arc::new(
        targets
            .iter()
            .map(|target| (target.target.clone(), target.clone()))
            .collect(),
    );
    Router::new()
        .fallback(lookup)
        .layer(TraceLayer::new_for_http())
        .with_state(targets)
}

async fn lookup(State(targets): State<Targets>, method: Method, uri: Uri) -> Response {
    if method != Method::GET || uri.path() == "/favicon.ico" {
        return StatusCode::NOT_IMPLEMENTED.into_response();
    }
    let Some(target) = targets.get(uri.path().trim_start_matches('/')) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    (
        StatusCode::OK,
        [
            ("udp_ipv4", target.udp_ipv4.to_string()),
            ("udp_port", target.udp_port.to_string()),
        ],
    )
        .into_response()
}

pub struct ApiServer {
    pub socket_addr: SocketAddr,
    app: Router,
}

impl ApiServer {
    pub fn new(socket_addr: SocketAddr, targets: &[TargetSettings]) -> Self {
        Self {
            socket_addr,
            app: router(targets),
        }
    }

    pub async fn run(self, shutdown: triggered::Listener) -> anyhow::Result<()> {
        tracing::info!(listen = %self.socket_addr, "starting lookup server");
        let listener = tokio::net::TcpListener::bind(self.socket_addr).await?;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("stopping lookup server");
        Ok(())
    }
}
