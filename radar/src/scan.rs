use serde::{Deserialize, Serialize};

/// Radio technology a scanned transmitter was observed on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "radio_access_type", rename_all = "lowercase")]
pub enum RadioAccessType {
    Gsm,
    Cdma,
    Umts,
    Wcdma,
    Lte,
    Emtc,
    Nbiot,
    Nr,
    Wifi,
}

/// One observation of a single transmitter made during a scan session.
///
/// Every record of a session (same source, session id and start time)
/// carries the same begin/end, duration and location fields.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Scan {
    #[sqlx(rename = "zid")]
    pub session_id: String,
    #[sqlx(rename = "xid")]
    pub transmitter_id: String,
    /// H3 cell of the session start location, empty when unknown
    pub cell: String,
    pub time: i64,
    pub duration: i64,
    pub distance: f64,
    pub bearing: f64,
    pub began: i64,
    pub began_loc: String,
    pub began_loc_hdop: i64,
    pub began_loc_time: i64,
    pub began_motion_time: i64,
    pub ended: i64,
    pub ended_loc: String,
    pub ended_loc_hdop: i64,
    pub ended_loc_time: i64,
    pub ended_motion_time: i64,
    pub rat: RadioAccessType,
    pub mcc: i64,
    pub mnc: i64,
    /// LAC for 2G/3G, TAC for 4G/5G
    pub tac: i64,
    pub cid: i64,
    pub pci: i64,
    pub band: i64,
    pub chan: i64,
    pub freq: i64,
    pub bssid: String,
    pub psc: i64,
    pub rssi: i64,
    pub rsrp: i64,
    pub rsrq: i64,
    pub rscp: i64,
    pub snr: i64,
    pub ssid: String,
}

/// A stored scan together with the bookkeeping the store assigned to it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ScanRecord {
    #[sqlx(rename = "db_serial")]
    pub serial: i64,
    #[sqlx(rename = "db_modified")]
    pub modified_ms: i64,
    #[sqlx(rename = "sid")]
    pub source_id: String,
    #[sqlx(flatten)]
    pub scan: Scan,
}

impl Scan {
    /// Received signal strength used to rank observations: RSSI, falling back
    /// to RSCP and then RSRP. Zero means the radio did not report a value.
    pub fn signal_strength(&self) -> Option<i64> {
        [self.rssi, self.rscp, self.rsrp]
            .into_iter()
            .find(|value| *value != 0)
    }

    pub fn transmitter(&self) -> Transmitter {
        let cell = || CellId {
            mcc: self.mcc,
            mnc: self.mnc,
            area: self.tac,
            cid: self.cid,
            signal: self.signal_strength(),
        };
        let carrier = || Carrier {
            pci: self.pci,
            band: self.band,
            channel: self.chan,
        };

        match self.rat {
            RadioAccessType::Gsm => Transmitter::Gsm(cell()),
            RadioAccessType::Cdma => Transmitter::Cdma(cell()),
            RadioAccessType::Umts => Transmitter::Umts {
                cell: cell(),
                psc: self.psc,
            },
            RadioAccessType::Wcdma => Transmitter::Wcdma {
                cell: cell(),
                psc: self.psc,
            },
            RadioAccessType::Lte => Transmitter::Lte {
                cell: cell(),
                carrier: carrier(),
            },
            RadioAccessType::Emtc => Transmitter::Emtc {
                cell: cell(),
                carrier: carrier(),
            },
            RadioAccessType::Nbiot => Transmitter::Nbiot {
                cell: cell(),
                carrier: carrier(),
            },
            RadioAccessType::Nr => Transmitter::Nr {
                cell: cell(),
                carrier: carrier(),
            },
            RadioAccessType::Wifi => Transmitter::Wifi(AccessPoint {
                bssid: self.bssid.clone(),
                ssid: self.ssid.clone(),
                channel: self.chan,
                frequency: self.freq,
                signal: self.signal_strength(),
                snr: self.snr,
            }),
        }
    }
}

impl ScanRecord {
    /// Records sharing this key belong to the same scan session.
    pub fn session_key(&self) -> (&str, &str, i64) {
        (&self.scan.session_id, &self.source_id, self.scan.began)
    }
}

/// Identity of a cellular transmitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellId {
    pub mcc: i64,
    pub mnc: i64,
    /// Location area code (2G/3G) or tracking area code (4G/5G)
    pub area: i64,
    pub cid: i64,
    pub signal: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    pub pci: i64,
    pub band: i64,
    pub channel: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub bssid: String,
    pub ssid: String,
    pub channel: i64,
    pub frequency: i64,
    pub signal: Option<i64>,
    pub snr: i64,
}

/// The transmitter a scan observed, carrying only the fields meaningful for
/// its radio technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transmitter {
    Gsm(CellId),
    Cdma(CellId),
    Umts { cell: CellId, psc: i64 },
    Wcdma { cell: CellId, psc: i64 },
    Lte { cell: CellId, carrier: Carrier },
    Emtc { cell: CellId, carrier: Carrier },
    Nbiot { cell: CellId, carrier: Carrier },
    Nr { cell: CellId, carrier: Carrier },
    Wifi(AccessPoint),
}
