//! Errors raised at the edges of the analysis (loading, configuration, selection)
//!
//! The analytical core itself never fails: undefined statistics are `None`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inputs or preparing an analysis
#[derive(Error, Debug)]
pub enum BenchdiffError {
    #[error("Snapshot file not found: {0}")]
    SnapshotNotFound(PathBuf),

    #[error("Invalid snapshot format: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),

    #[error("Invalid configuration file: {0}")]
    InvalidConfigFile(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid environment pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No environments match patterns: {0}")]
    NoEnvironments(String),

    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error("Failed to render report: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for benchdiff operations
pub type Result<T> = std::result::Result<T, BenchdiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BenchdiffError::NoEnvironments("prod-%".to_string());
        assert_eq!(err.to_string(), "No environments match patterns: prod-%");

        let err = BenchdiffError::InvalidPattern {
            pattern: "[".to_string(),
            reason: "unclosed".to_string(),
        };
        assert!(err.to_string().contains("'['"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BenchdiffError = io.into();
        assert!(matches!(err, BenchdiffError::IoError(_)));
    }
}
