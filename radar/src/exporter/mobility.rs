use std::collections::HashMap;

use crate::{error::StoreError, store::Store};

/// Decides whether a WiFi access point moves around, judged by how far apart
/// its stored sightings are. Answers are remembered for the lifetime of the
/// check, which is one export batch.
#[derive(Debug)]
pub struct MobilityCheck {
    threshold_meters: f64,
    known: HashMap<String, bool>,
}

impl MobilityCheck {
    pub fn new(threshold_meters: f64) -> Self {
        Self {
            threshold_meters,
            known: HashMap::new(),
        }
    }

    pub async fn is_mobile(
        &mut self,
        store: &dyn Store,
        transmitter_id: &str,
    ) -> Result<bool, StoreError> {
        if let Some(mobile) = self.known.get(transmitter_id) {
            return Ok(*mobile);
        }
        let locations = store.sighting_locations(transmitter_id).await?;
        let spread = olc_geo::max_pairwise_distance_meters(locations.iter().map(String::as_str));
        let mobile = spread > self.threshold_meters;
        if mobile {
            tracing::debug!(transmitter_id, spread, "transmitter seen far apart");
        }
        self.known.insert(transmitter_id.to_string(), mobile);
        Ok(mobile)
    }
}
