//! Error types for the gap reconstruction library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tensor dimensions do not agree
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Insufficient data for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Storage collaborator failed
    #[error("Data source error: {0}")]
    DataSource(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Whether the failure concerns a single company and the caller may move on
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Error::DataSource(_)
                | Error::InsufficientData(_)
                | Error::Io(_)
                | Error::Csv(_)
                | Error::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ShapeMismatch {
            context: "encoder input",
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Shape mismatch in encoder input: expected 4, got 3"
        );
    }

    #[test]
    fn test_skippable() {
        assert!(Error::DataSource("gone".into()).is_skippable());
        assert!(Error::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied)).is_skippable());
        assert!(!Error::Config("bad".into()).is_skippable());
    }
}
