pub mod notes;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use self::notes::{Event, RadarScan, SCAN_NOTEFILE, TRACK_NOTEFILE};
use crate::{
    contact::{Contact, ContactCache},
    error::{DecodeError, StoreError},
    exporter::WakeSignal,
    scan::Scan,
    store::Store,
    telemetry,
    track::Track,
};

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "err": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct IngestState {
    store: Arc<dyn Store>,
    wake: WakeSignal,
    contacts: Arc<ContactCache>,
}

impl IngestState {
    pub fn new(store: Arc<dyn Store>, wake: WakeSignal, contact_cache_ttl: Duration) -> Self {
        Self {
            store,
            wake,
            contacts: Arc::new(ContactCache::new(contact_cache_ttl)),
        }
    }
}

pub fn router(state: IngestState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/favicon.ico", get(empty_handler))
        .route("/ping", get(ping))
        .route("/ingest", post(ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    pub socket_addr: SocketAddr,
    app: Router,
}

impl ApiServer {
    pub fn new(socket_addr: SocketAddr, state: IngestState) -> Self {
        Self {
            socket_addr,
            app: router(state),
        }
    }

    pub async fn run(self, shutdown: triggered::Listener) -> anyhow::Result<()> {
        tracing::info!(listen = %self.socket_addr, "starting ingest server");
        let listener = tokio::net::TcpListener::bind(self.socket_addr).await?;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("stopping ingest server");
        Ok(())
    }
}

async fn root() -> &'static str {
    "radar ingest\n"
}

async fn empty_handler() {}

async fn ping() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

async fn ingest(
    State(state): State<IngestState>,
    body: Bytes,
) -> Result<StatusCode, IngestError> {
    if body.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }
    let event: Event = serde_json::from_slice(&body)
        .map_err(DecodeError::from)
        .inspect_err(|_| telemetry::count_ingest_rejected("envelope"))?;

    let Some(note) = event.body.clone() else {
        return Ok(StatusCode::OK);
    };

    let notefile = event.notefile.as_str();
    if notefile != SCAN_NOTEFILE && notefile != TRACK_NOTEFILE {
        tracing::debug!(notefile, "ignoring note");
        return Ok(StatusCode::OK);
    }
    if event.device_uid.is_empty() {
        telemetry::count_ingest_rejected("device");
        return Err(DecodeError::MissingField("device").into());
    }

    if notefile == SCAN_NOTEFILE {
        let scan = decode_scan(note).inspect_err(|_| telemetry::count_ingest_rejected("scan"))?;
        state.store.insert_scan(&event.device_uid, &scan).await?;
        telemetry::count_scan_ingested();
        state.wake.signal();
    } else {
        let track = serde_json::from_value::<Track>(note)
            .map_err(DecodeError::from)
            .inspect_err(|_| telemetry::count_ingest_rejected("track"))?
            .with_cell();
        state.store.insert_track(&event.device_uid, &track).await?;
        telemetry::count_track_ingested();
    }

    if event.when != 0 {
        upsert_contact(&state, &event).await?;
    }
    Ok(StatusCode::OK)
}

fn decode_scan(note: serde_json::Value) -> Result<Scan, DecodeError> {
    serde_json::from_value::<RadarScan>(note)?.try_into()
}

async fn upsert_contact(state: &IngestState, event: &Event) -> Result<(), StoreError> {
    let contact = Contact {
        device_uid: event.device_uid.clone(),
        serial_number: event.serial_number.clone(),
        time: event.when,
        info: event.contact.clone().unwrap_or_default(),
    };
    if !state.contacts.update(&contact).await {
        return Ok(());
    }
    let result = state.store.upsert_contact(&contact).await;
    if result.is_err() {
        state.contacts.forget(&contact.device_uid).await;
    }
    result
}
