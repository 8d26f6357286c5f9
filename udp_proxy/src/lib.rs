pub mod error;
pub mod lookup;
pub mod relay;
pub mod settings;
pub mod telemetry;

pub use error::RelayError;
pub use settings::Settings;
