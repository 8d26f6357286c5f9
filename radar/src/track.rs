use serde::Deserialize;

/// A GPS / motion sample reported by a device. Tracks are stored for later
/// analysis but never exported.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Track {
    /// When the sample was added on the device
    #[serde(rename = "when")]
    pub added: i64,
    pub loc: String,
    /// When the location fix was taken
    pub time: i64,
    pub hdop: i64,
    pub journey: i64,
    pub jcount: i64,
    pub motion: i64,
    pub motion_time: i64,
    pub motion_distance: f64,
    pub motion_bearing: f64,
    pub motion_velocity: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub usb: bool,
    pub charging: bool,
    pub heartbeat: bool,
    #[serde(skip)]
    pub cell: String,
}

impl Track {
    pub fn with_cell(mut self) -> Self {
        self.cell = olc_geo::cell_from_code(&self.loc).unwrap_or_default();
        self
    }
}
