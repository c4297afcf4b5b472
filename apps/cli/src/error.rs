//! Error types for the Billbook CLI.

use std::path::PathBuf;

use billbook_core::{CoreError, ValidationError};
use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A calculation or lookup in the core failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot file not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to render output: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_pass_through() {
        let err: CliError = CoreError::ClientNotFound("Initech".to_string()).into();
        assert_eq!(err.to_string(), "Client not found: Initech");
    }

    #[test]
    fn test_render_errors_convert() {
        let err: CliError = std::fmt::Error.into();
        assert!(matches!(err, CliError::Render(_)));
    }

    #[test]
    fn test_snapshot_not_found_message() {
        let err = CliError::SnapshotNotFound(PathBuf::from("data/billbook.json"));
        assert_eq!(err.to_string(), "Snapshot file not found: data/billbook.json");
    }
}
