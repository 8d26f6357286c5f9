mod error;
mod settings;

pub mod metric_tracker;
pub mod state;

pub use error::{Error, Result};
pub use settings::Settings;
