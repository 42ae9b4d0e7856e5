//! Error types for the PV calculator.

use sf_core::SfError;
use thiserror::Error;

/// Result type for PV operations.
pub type PvResult<T> = Result<T, PvError>;

/// Errors raised before any PV output is computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PvError {
    /// A parameter or input series is missing, out of range or malformed
    #[error("Invalid configuration for '{field}': {reason}")]
    Configuration { field: &'static str, reason: String },
}

impl PvError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        PvError::Configuration {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            PvError::Configuration { field, .. } => field,
        }
    }
}

impl From<PvError> for SfError {
    fn from(e: PvError) -> Self {
        match e {
            PvError::Configuration { field, .. } => SfError::InvalidArg { what: field },
        }
    }
}
