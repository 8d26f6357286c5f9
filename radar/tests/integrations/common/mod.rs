use std::{sync::Arc, time::Duration};

use radar::{
    exporter::{Exporter, MemorySink, WakeSignal},
    scan::{RadioAccessType, Scan},
    settings::ExporterSettings,
    store::MemoryStore,
};

pub const SCANNER: &str = "dev:864475040512345";

/// An observation made at a fixed location with every radio field zeroed.
pub fn scan(session_id: &str, transmitter_id: &str, rat: RadioAccessType) -> Scan {
    Scan {
        session_id: session_id.to_string(),
        transmitter_id: transmitter_id.to_string(),
        cell: String::new(),
        time: 1_000,
        duration: 10,
        distance: 0.0,
        bearing: 0.0,
        began: 1_000,
        began_loc: "87JC9W76+2X".to_string(),
        began_loc_hdop: 1,
        began_loc_time: 1_000,
        began_motion_time: 0,
        ended: 1_010,
        ended_loc: String::new(),
        ended_loc_hdop: 0,
        ended_loc_time: 0,
        ended_motion_time: 0,
        rat,
        mcc: 0,
        mnc: 0,
        tac: 0,
        cid: 0,
        pci: 0,
        band: 0,
        chan: 0,
        freq: 0,
        bssid: String::new(),
        psc: 0,
        rssi: 0,
        rsrp: 0,
        rsrq: 0,
        rscp: 0,
        snr: 0,
        ssid: String::new(),
    }
}

pub fn lte_scan(session_id: &str, transmitter_id: &str, cid: i64, rsrp: i64) -> Scan {
    Scan {
        mcc: 310,
        mnc: 410,
        tac: 7,
        cid,
        pci: 101,
        band: 12,
        chan: 5110,
        rsrp,
        ..scan(session_id, transmitter_id, RadioAccessType::Lte)
    }
}

pub fn wifi_scan(session_id: &str, bssid: &str, rssi: i64) -> Scan {
    Scan {
        bssid: bssid.to_string(),
        ssid: "guest".to_string(),
        chan: 6,
        freq: 2437,
        rssi,
        ..scan(session_id, bssid, RadioAccessType::Wifi)
    }
}

pub fn settings() -> ExporterSettings {
    ExporterSettings {
        batch_limit: 100,
        idle_timeout: Duration::from_secs(60),
        settle_delay: Duration::from_millis(1),
        retry_interval: Duration::from_millis(10),
        ..ExporterSettings::default()
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub sink: Arc<MemorySink>,
    pub wake: WakeSignal,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            sink: Arc::new(MemorySink::default()),
            wake: WakeSignal::new(),
        }
    }

    pub fn exporter(&self, settings: ExporterSettings) -> Exporter {
        Exporter::new(
            self.store.clone(),
            self.sink.clone(),
            self.wake.clone(),
            settings,
        )
    }
}
