use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use radar::{
    exporter::WakeSignal,
    ingest::{router, IngestState},
    scan::RadioAccessType,
    store::MemoryStore,
};
use serde_json::json;
use tower::ServiceExt;

use crate::common::SCANNER;

struct Api {
    store: Arc<MemoryStore>,
    wake: WakeSignal,
    router: Router,
}

impl Api {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let wake = WakeSignal::new();
        let router = router(IngestState::new(
            store.clone(),
            wake.clone(),
            Duration::from_secs(60),
        ));
        Self {
            store,
            wake,
            router,
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Body) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .expect("request");
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn post(&self, event: serde_json::Value) -> (StatusCode, String) {
        self.call(Method::POST, "/ingest", Body::from(event.to_string()))
            .await
    }
}

fn scan_event(when: i64) -> serde_json::Value {
    json!({
        "device": SCANNER,
        "sn": "radar-7",
        "file": "scan.qo",
        "when": when,
        "body": {
            "zid": "87JC9W00+",
            "xid": "310-410-7-12345",
            "time": 1_000,
            "began": 1_000,
            "duration": 10,
            "began_loc": "87JC9W76+2X",
            "rat": "lte",
            "mcc": 310,
            "mnc": 410,
            "tac": 7,
            "cid": 12345,
            "rsrp": -98,
        },
        "contact": { "name": "Ada", "org": "Blues", "role": "ops", "email": "ada@example.com" },
    })
}

#[tokio::test]
async fn empty_body_is_no_content() {
    let api = Api::new();
    let (status, _) = api.call(Method::POST, "/ingest", Body::empty()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_envelope_is_rejected() {
    let api = Api::new();
    let (status, body) = api
        .call(Method::POST, "/ingest", Body::from("{not json"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body).expect("json error body");
    assert!(body["err"].is_string());
}

#[tokio::test]
async fn other_notefiles_are_acknowledged() {
    let api = Api::new();
    let (status, _) = api
        .post(json!({ "device": SCANNER, "file": "_health.qo", "body": { "text": "boot" } }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(api.store.scans().is_empty());
    assert!(api.store.tracks().is_empty());
}

#[tokio::test]
async fn scan_is_stored_and_wakes_exporter() {
    let api = Api::new();
    let (status, _) = api.post(scan_event(1_700_000_000)).await;
    assert_eq!(status, StatusCode::OK);

    let scans = api.store.scans();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].source_id, SCANNER);
    assert_eq!(scans[0].scan.session_id, "87JC9W00+");
    assert_eq!(scans[0].scan.rat, RadioAccessType::Lte);
    assert_eq!(scans[0].scan.cell.len(), 16);
    assert!(api.wake.wait(Duration::from_millis(50)).await);

    let contact = api.store.contact(SCANNER).expect("contact");
    assert_eq!(contact.serial_number, "radar-7");
    assert_eq!(contact.time, 1_700_000_000);
    assert_eq!(contact.info.affiliation, "Blues");
}

#[tokio::test]
async fn contact_is_skipped_without_event_time() {
    let api = Api::new();
    let (status, _) = api.post(scan_event(0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(api.store.scans().len(), 1);
    assert!(api.store.contact(SCANNER).is_none());
}

#[tokio::test]
async fn scan_without_radio_type_is_rejected() {
    let api = Api::new();
    let mut event = scan_event(0);
    event["body"]["rat"] = serde_json::Value::Null;
    let (status, _) = api.post(event).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(api.store.scans().is_empty());
    assert!(!api.wake.wait(Duration::from_millis(10)).await);
}

#[tokio::test]
async fn scan_without_device_is_rejected() {
    let api = Api::new();
    let mut event = scan_event(0);
    event["device"] = json!("");
    let (status, _) = api.post(event).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(api.store.scans().is_empty());
}

#[tokio::test]
async fn store_failure_is_server_error() {
    let api = Api::new();
    api.store.set_unavailable(true);
    let (status, _) = api.post(scan_event(0)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn track_is_stored_with_cell() {
    let api = Api::new();
    let (status, _) = api
        .post(json!({
            "device": SCANNER,
            "file": "track.qo",
            "when": 0,
            "body": {
                "loc": "87JC9W76+2X",
                "time": 1_000,
                "journey": 1_000,
                "jcount": 3,
                "temperature": 21.5,
                "usb": true,
            },
        }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let tracks = api.store.tracks();
    assert_eq!(tracks.len(), 1);
    let (source_id, track) = &tracks[0];
    assert_eq!(source_id, SCANNER);
    assert_eq!(track.jcount, 3);
    assert!(track.usb);
    assert_eq!(track.cell.len(), 16);
}

#[tokio::test]
async fn ping_and_root() {
    let api = Api::new();
    let (status, body) = api.call(Method::GET, "/ping", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(chrono::NaiveDateTime::parse_from_str(&body, "%Y-%m-%dT%H:%M:%SZ").is_ok());

    let (status, body) = api.call(Method::GET, "/", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "radar ingest\n");

    let (status, _) = api.call(Method::GET, "/favicon.ico", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
}
