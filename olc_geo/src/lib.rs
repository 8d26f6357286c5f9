pub mod cell;
pub mod geo;
pub mod olc;

pub use cell::{cell_from_code, cell_from_lat_lon, CELL_RESOLUTION};
pub use geo::{
    code_distance_meters, code_initial_bearing, code_midpoint, distance_meters,
    initial_bearing_degrees, max_pairwise_distance_meters, midpoint, EARTH_RADIUS_METERS,
};
pub use olc::{decode, CodeArea};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid location code: {0:?}")]
    InvalidCode(String),
}

/// A coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Decodes a location code to the center of the area it describes.
pub fn location_to_lat_lon(code: &str) -> Result<LatLon, DecodeError> {
    decode(code).map(|area| olc::center(&area))
}
