//! Utility module
//!
//! - Configuration management
//! - Logging setup

mod config;
mod logging;

pub use config::{
    Config, ExtractionSection, FeaturesSection, LoggingSection, ModelSection, TrainingSection,
};
pub use logging::setup_logging;
