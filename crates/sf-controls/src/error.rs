//! Error types for control policy operations.

use thiserror::Error;

/// Result type for control policy operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur when building a control policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
