//! Error handling module for stepform
//!
//! Provides centralized error handling with proper error types using thiserror.
//! User-facing form conditions (missing values, malformed phone numbers,
//! repeater limits) are not errors here; they travel as effects. These types
//! cover programmer and IO failures.

use crate::repeater::RepeaterError;
use thiserror::Error;

/// Main error type for stepform
#[derive(Error, Debug)]
pub enum FormError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),


    /// A command referenced a field the definition does not declare
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Repeater operation rejected
    #[error("Repeater error: {0}")]
    Repeater(#[from] RepeaterError),

    /// Submission sink failed to accept a submission
    #[error("Submission failed: {0}")]
    Submission(String),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for stepform operations
pub type Result<T> = std::result::Result<T, FormError>;

// Convenient error constructors
impl FormError {
    /// Create an unknown field error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField(name.into())
    }

    /// Create a submission error
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }
}

/// Helper function to create general errors
pub fn general_error(msg: impl Into<String>) -> FormError {
    FormError::General(msg.into())
}
