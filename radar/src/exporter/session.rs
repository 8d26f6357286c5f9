use std::{cmp::Reverse, collections::HashSet};

use crate::scan::{Scan, ScanRecord};

/// The records of one scan pass: same session id, same scanning device and
/// same start time. Records are ordered strongest signal first.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub records: Vec<ScanRecord>,
}

impl Session {
    /// Any record of the session; all of them share the begin / end fields.
    pub fn first(&self) -> &Scan {
        &self.records[0].scan
    }

    pub fn source_id(&self) -> &str {
        &self.records[0].source_id
    }

    pub fn session_id(&self) -> &str {
        &self.records[0].scan.session_id
    }

    /// Keep only the first, and so strongest, observation of each
    /// transmitter.
    pub fn dedup_transmitters(&mut self) {
        let mut seen = HashSet::new();
        self.records
            .retain(|record| seen.insert(record.scan.transmitter_id.clone()));
    }
}

fn sort_key(record: &ScanRecord) -> (&str, &str, i64, Reverse<Option<i64>>, i64) {
    let (session_id, source_id, began) = record.session_key();
    (
        session_id,
        source_id,
        began,
        Reverse(record.scan.signal_strength()),
        record.serial,
    )
}

/// Orders a batch of records and splits it into sessions.
pub fn group_sessions(mut records: Vec<ScanRecord>) -> Vec<Session> {
    records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    let mut sessions: Vec<Session> = vec![];
    for record in records {
        match sessions.last_mut() {
            Some(session) if session.records[0].session_key() == record.session_key() => {
                session.records.push(record)
            }
            _ => sessions.push(Session {
                records: vec![record],
            }),
        }
    }
    sessions
}
