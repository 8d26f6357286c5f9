pub mod contact;
pub mod error;
pub mod exporter;
pub mod ingest;
pub mod scan;
pub mod settings;
pub mod store;
pub mod telemetry;
pub mod track;

pub use settings::Settings;
