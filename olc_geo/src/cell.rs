use h3o::{LatLng, Resolution};

use crate::location_to_lat_lon;

pub const CELL_RESOLUTION: Resolution = Resolution::Eight;

/// H3 cell containing the coordinate, as 16 upper case hex digits.
///
/// The null island coordinate (0, 0) is what devices report without a fix,
/// so it never maps to a cell.
pub fn cell_from_lat_lon(lat: f64, lon: f64) -> Option<String> {
    if lat == 0.0 && lon == 0.0 {
        return None;
    }
    let cell = LatLng::new(lat, lon).ok()?.to_cell(CELL_RESOLUTION);
    Some(format!("{:016X}", u64::from(cell)))
}

pub fn cell_from_code(code: &str) -> Option<String> {
    let point = location_to_lat_lon(code).ok()?;
    cell_from_lat_lon(point.lat, point.lon)
}
