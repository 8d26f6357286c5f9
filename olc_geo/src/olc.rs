//! Open Location Code ("plus code") decoding on top of the reference
//! `open-location-code` crate.

pub use open_location_code::CodeArea;

use crate::{DecodeError, LatLon};

/// Decodes a full code into the area it describes. Short codes are
/// rejected.
pub fn decode(code: &str) -> Result<CodeArea, DecodeError> {
    open_location_code::decode(&code.to_ascii_uppercase())
        .map_err(|_| DecodeError::InvalidCode(code.to_string()))
}

/// Center of a decoded area.
pub fn center(area: &CodeArea) -> LatLon {
    LatLon {
        lat: area.center.y(),
        lon: area.center.x(),
    }
}
