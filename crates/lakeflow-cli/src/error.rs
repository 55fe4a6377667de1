//! Error types for the Lakeflow CLI
//!
//! CLI errors are user-facing: each message says what went wrong and what to
//! do about it.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Run 'lakeflow config validate' to check the file.")]
    Config(String),

    /// Required file is missing or unreadable
    #[error("File operation failed: {0}. Verify the path exists and you have read permissions.")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. Check the file syntax.")]
    JsonParse(#[from] serde_json::Error),

    /// Layout generation failed
    #[error(transparent)]
    Layout(#[from] lakeflow_common::LakeflowError),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
