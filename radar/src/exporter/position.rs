use olc_geo::{distance_meters, initial_bearing_degrees, location_to_lat_lon, midpoint, LatLon};

use crate::{error::DecodeError, scan::Scan};

/// Where the scanning device was at one moment of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
    /// Meters
    pub accuracy: Option<f64>,
    /// Meters per second
    pub speed: Option<f64>,
    /// Degrees clockwise from north
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionEstimate {
    /// Halfway through the session, used as the submission timestamp
    pub timestamp_ms: i64,
    pub fixes: Vec<PositionFix>,
}

/// Estimates the device track over a session from its begin and end
/// locations.
///
/// A session without a decodable start location cannot be placed and is an
/// error. Without a distinct, decodable end location the device is assumed
/// to have stood still at the start. Otherwise the track is described by
/// three fixes: start, great-circle midpoint and end.
pub fn estimate(scan: &Scan) -> Result<PositionEstimate, DecodeError> {
    let start = location_to_lat_lon(&scan.began_loc)?;
    let began_ms = seconds_to_ms(Some(scan.began), "began")?;
    let timestamp_ms = seconds_to_ms(scan.began.checked_add(scan.duration / 2), "duration")?;

    let end = if scan.ended_loc.is_empty() || scan.ended_loc == scan.began_loc {
        None
    } else {
        location_to_lat_lon(&scan.ended_loc)
            .ok()
            .filter(|end| *end != start)
    };

    let Some(end) = end else {
        return Ok(PositionEstimate {
            timestamp_ms,
            fixes: vec![fix(start, began_ms, None, None, None)],
        });
    };

    let distance = distance_meters(start, end);
    let accuracy = Some(distance / 2.0);
    let speed = (scan.duration > 0).then(|| distance / scan.duration as f64);
    let heading = Some(initial_bearing_degrees(start, end));
    let ended_ms = if scan.ended != 0 {
        seconds_to_ms(Some(scan.ended), "ended")?
    } else {
        seconds_to_ms(scan.began.checked_add(scan.duration), "duration")?
    };

    Ok(PositionEstimate {
        timestamp_ms,
        fixes: vec![
            fix(start, began_ms, accuracy, speed, heading),
            fix(midpoint(start, end), timestamp_ms, accuracy, speed, heading),
            fix(end, ended_ms, accuracy, speed, heading),
        ],
    })
}

fn seconds_to_ms(seconds: Option<i64>, field: &'static str) -> Result<i64, DecodeError> {
    seconds
        .and_then(|seconds| seconds.checked_mul(1000))
        .ok_or(DecodeError::OutOfRange(field))
}

fn fix(
    point: LatLon,
    timestamp_ms: i64,
    accuracy: Option<f64>,
    speed: Option<f64>,
    heading: Option<f64>,
) -> PositionFix {
    PositionFix {
        latitude: point.lat,
        longitude: point.lon,
        timestamp_ms,
        accuracy,
        speed,
        heading,
    }
}
