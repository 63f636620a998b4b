//! Shared API request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========================================
// Error Response Types
// ========================================

/// Error body returned with every 4xx/5xx response
///
/// # Examples
///
/// ```
/// use catalog_common::api::types::ErrorResponse;
///
/// let error = ErrorResponse::new("NOT_FOUND", "Book 12 not found");
/// assert_eq!(error.message, "Book 12 not found");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Create new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create error response with details
    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
