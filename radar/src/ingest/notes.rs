//! Event envelopes and note bodies as delivered by the device hub.

use serde::Deserialize;

use crate::{
    contact::ContactInfo,
    error::DecodeError,
    scan::{RadioAccessType, Scan},
};

pub const SCAN_NOTEFILE: &str = "scan.qo";
pub const TRACK_NOTEFILE: &str = "track.qo";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(rename = "device")]
    pub device_uid: String,
    #[serde(rename = "sn")]
    pub serial_number: String,
    #[serde(rename = "file")]
    pub notefile: String,
    pub when: i64,
    pub body: Option<serde_json::Value>,
    pub contact: Option<ContactInfo>,
}

/// Body of a `scan.qo` note.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RadarScan {
    pub sid: String,
    #[serde(alias = "tid")]
    pub zid: String,
    pub xid: String,
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
    pub rat: Option<RadioAccessType>,
    pub mcc: i64,
    pub mnc: i64,
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

impl TryFrom<RadarScan> for Scan {
    type Error = DecodeError;

    fn try_from(note: RadarScan) -> Result<Self, Self::Error> {
        let rat = note.rat.ok_or(DecodeError::MissingField("rat"))?;
        Ok(Self {
            cell: olc_geo::cell_from_code(&note.began_loc).unwrap_or_default(),
            session_id: note.zid,
            transmitter_id: note.xid,
            time: note.time,
            duration: note.duration,
            distance: note.distance,
            bearing: note.bearing,
            began: note.began,
            began_loc: note.began_loc,
            began_loc_hdop: note.began_loc_hdop,
            began_loc_time: note.began_loc_time,
            began_motion_time: note.began_motion_time,
            ended: note.ended,
            ended_loc: note.ended_loc,
            ended_loc_hdop: note.ended_loc_hdop,
            ended_loc_time: note.ended_loc_time,
            ended_motion_time: note.ended_motion_time,
            rat,
            mcc: note.mcc,
            mnc: note.mnc,
            tac: note.tac,
            cid: note.cid,
            pci: note.pci,
            band: note.band,
            chan: note.chan,
            freq: note.freq,
            bssid: note.bssid,
            psc: note.psc,
            rssi: note.rssi,
            rsrp: note.rsrp,
            rsrq: note.rsrq,
            rscp: note.rscp,
            snr: note.snr,
            ssid: note.ssid,
        })
    }
}
