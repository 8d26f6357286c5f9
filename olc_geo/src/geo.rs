use crate::{location_to_lat_lon, DecodeError, LatLon};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, from the length of the
/// chord joining them on the unit sphere.
pub fn distance_meters(a: LatLon, b: LatLon) -> f64 {
    let dlon = (a.lon - b.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let dz = lat1.sin() - lat2.sin();
    let dx = dlon.cos() * lat1.cos() - lat2.cos();
    let dy = dlon.sin() * lat1.cos();
    let chord = (dx * dx + dy * dy + dz * dz).abs().sqrt();
    (chord / 2.0).asin() * 2.0 * EARTH_RADIUS_METERS
}

/// Initial bearing from `a` towards `b`, in degrees within `[0, 360)`.
pub fn initial_bearing_degrees(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // -0.0 and values that round up to 360 both land on 0
    if bearing >= 360.0 || bearing == 0.0 {
        0.0
    } else {
        bearing
    }
}

/// Point halfway along the great circle between `a` and `b`.
pub fn midpoint(a: LatLon, b: LatLon) -> LatLon {
    if a == b {
        return a;
    }
    let lat1 = a.lat.to_radians();
    let lon1 = a.lon.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let bx = lat2.cos() * dlon.cos();
    let by = lat2.cos() * dlon.sin();
    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    LatLon {
        lat: lat.to_degrees(),
        lon: normalize_longitude(lon.to_degrees()),
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}

pub fn code_distance_meters(a: &str, b: &str) -> Result<f64, DecodeError> {
    Ok(distance_meters(
        location_to_lat_lon(a)?,
        location_to_lat_lon(b)?,
    ))
}

pub fn code_initial_bearing(a: &str, b: &str) -> Result<f64, DecodeError> {
    Ok(initial_bearing_degrees(
        location_to_lat_lon(a)?,
        location_to_lat_lon(b)?,
    ))
}

pub fn code_midpoint(a: &str, b: &str) -> Result<LatLon, DecodeError> {
    Ok(midpoint(location_to_lat_lon(a)?, location_to_lat_lon(b)?))
}

/// Largest distance between any two of the given location codes. Codes that
/// fail to decode are ignored.
pub fn max_pairwise_distance_meters<'a>(codes: impl IntoIterator<Item = &'a str>) -> f64 {
    let points: Vec<LatLon> = codes
        .into_iter()
        .filter_map(|code| location_to_lat_lon(code).ok())
        .collect();

    let mut max = 0.0_f64;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            max = max.max(distance_meters(*a, *b));
        }
    }
    max
}
