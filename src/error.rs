//! Error types for sweepr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in sweepr
#[derive(Debug, Error)]
pub enum SweeprError {
    /// External command failed while running non-silently
    #[error("Command failed: {0}")]
    CommandExecution(String),

    /// Setup-phase failure (not a repo, gh missing/unauthenticated, bad dir)
    #[error("Setup error: {0}")]
    Setup(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sweepr operations
pub type Result<T> = std::result::Result<T, SweeprError>;
