//! Outbound location-fix submissions, one per scan session.

use serde::Serialize;

use super::position::{PositionEstimate, PositionFix};
use crate::scan::{AccessPoint, Carrier, CellId, ScanRecord, Transmitter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub timestamp: i64,
    pub gps: Vec<GpsFix>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<CellObservation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wifi: Vec<WifiObservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsFix {
    pub source: &'static str,
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Radio {
    Gsm,
    Cdma,
    Umts,
    Lte,
    Nbiot,
    Nr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellObservation {
    pub radio: Radio,
    pub timestamp: i64,
    pub mcc: i64,
    pub mnc: i64,
    pub lac: i64,
    pub cid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psc: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pci: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiObservation {
    pub timestamp: i64,
    pub bssid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_to_noise_ratio: Option<i64>,
}

fn non_zero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

impl From<&PositionFix> for GpsFix {
    fn from(fix: &PositionFix) -> Self {
        Self {
            source: "gps",
            timestamp: fix.timestamp_ms,
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            speed: fix.speed,
            heading: fix.heading,
        }
    }
}

impl CellObservation {
    fn new(radio: Radio, timestamp: i64, cell: CellId) -> Self {
        Self {
            radio,
            timestamp,
            mcc: cell.mcc,
            mnc: cell.mnc,
            lac: cell.area,
            cid: cell.cid,
            psc: None,
            pci: None,
            band: None,
            channel: None,
            signal: cell.signal,
        }
    }

    fn with_psc(self, psc: i64) -> Self {
        Self {
            psc: non_zero(psc),
            ..self
        }
    }

    fn with_carrier(self, carrier: Carrier) -> Self {
        Self {
            pci: non_zero(carrier.pci),
            band: non_zero(carrier.band),
            channel: non_zero(carrier.channel),
            ..self
        }
    }
}

impl WifiObservation {
    fn new(timestamp: i64, ap: AccessPoint) -> Self {
        Self {
            timestamp,
            bssid: ap.bssid,
            ssid: ap.ssid,
            channel: non_zero(ap.channel),
            frequency: non_zero(ap.frequency),
            signal: ap.signal,
            signal_to_noise_ratio: non_zero(ap.snr),
        }
    }
}

enum Observation {
    Cell(CellObservation),
    Wifi(WifiObservation),
}

fn observation(timestamp: i64, transmitter: Transmitter) -> Observation {
    use Observation::{Cell, Wifi};

    match transmitter {
        Transmitter::Gsm(cell) => Cell(CellObservation::new(Radio::Gsm, timestamp, cell)),
        Transmitter::Cdma(cell) => Cell(CellObservation::new(Radio::Cdma, timestamp, cell)),
        Transmitter::Umts { cell, psc } | Transmitter::Wcdma { cell, psc } => {
            Cell(CellObservation::new(Radio::Umts, timestamp, cell).with_psc(psc))
        }
        Transmitter::Lte { cell, carrier } | Transmitter::Emtc { cell, carrier } => {
            Cell(CellObservation::new(Radio::Lte, timestamp, cell).with_carrier(carrier))
        }
        Transmitter::Nbiot { cell, carrier } => {
            Cell(CellObservation::new(Radio::Nbiot, timestamp, cell).with_carrier(carrier))
        }
        Transmitter::Nr { cell, carrier } => {
            Cell(CellObservation::new(Radio::Nr, timestamp, cell).with_carrier(carrier))
        }
        Transmitter::Wifi(ap) => Wifi(WifiObservation::new(timestamp, ap)),
    }
}

impl Submission {
    /// Builds the submission for a session from its position estimate and
    /// the records retained after deduplication and mobility filtering.
    pub fn new<'a>(
        estimate: &PositionEstimate,
        records: impl IntoIterator<Item = &'a ScanRecord>,
    ) -> Self {
        let timestamp = estimate.timestamp_ms;
        let mut submission = Self {
            timestamp,
            gps: estimate.fixes.iter().map(GpsFix::from).collect(),
            cells: vec![],
            wifi: vec![],
        };
        for record in records {
            match observation(timestamp, record.scan.transmitter()) {
                Observation::Cell(cell) => submission.cells.push(cell),
                Observation::Wifi(wifi) => submission.wifi.push(wifi),
            }
        }
        submission
    }
}
