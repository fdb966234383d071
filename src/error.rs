//! Custom error types for ami-audit.

use thiserror::Error;

/// Errors that can occur while querying the EC2 API or shaping its records.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("AWS API error during {operation}: {message}")]
    Api { operation: String, message: String },

    #[error("Invalid creation timestamp '{raw}': {reason}")]
    InvalidTimestamp { raw: String, reason: String },
}

impl AuditError {
    /// Wrap an AWS SDK error, tagging it with the API operation that failed.
    pub fn api<E: std::fmt::Display>(operation: &str, err: E) -> Self {
        AuditError::Api {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}
