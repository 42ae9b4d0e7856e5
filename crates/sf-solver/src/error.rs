//! Error types for solver operations.

use sf_core::SfError;
use thiserror::Error;

/// Errors that can occur while solving for a field-control fraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Invalid problem: {what}")]
    InvalidProblem { what: &'static str },

    #[error("Non-finite evaluation at field control {field_control}: {value}")]
    NonFinite { field_control: f64, value: f64 },

    #[error("Core error: {0}")]
    Core(#[from] SfError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for SfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidConfig { what } | SolverError::InvalidProblem { what } => {
                SfError::InvalidArg { what }
            }
            SolverError::NonFinite { value, .. } => SfError::NonFinite {
                what: "defocus evaluation",
                value,
            },
            SolverError::Core(e) => e,
        }
    }
}
