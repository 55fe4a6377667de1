//! Error types for Lakeflow

use thiserror::Error;

/// Result type alias for Lakeflow operations
pub type Result<T> = std::result::Result<T, LakeflowError>;

/// Main error type for Lakeflow
#[derive(Error, Debug)]
pub enum LakeflowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Secret retrieval error: {0}")]
    Secret(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("Run lock held for destination prefix: {0}")]
    LockHeld(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl LakeflowError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a secret retrieval error
    pub fn secret(msg: impl Into<String>) -> Self {
        Self::Secret(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a Parquet error
    pub fn parquet(msg: impl Into<String>) -> Self {
        Self::Parquet(msg.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LakeflowError::config("missing WorkflowName");
        assert_eq!(err.to_string(), "Configuration error: missing WorkflowName");

        let err = LakeflowError::LockHeld("mydb/public.orders/".to_string());
        assert!(err.to_string().contains("mydb/public.orders/"));
    }
}
