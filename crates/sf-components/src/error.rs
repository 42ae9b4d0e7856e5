//! Error types for component operations.

use sf_core::error::SfError;
use thiserror::Error;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what} = {value}")]
    NonPhysical { what: &'static str, value: f64 },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Weather requested out of sequence: expected step {expected}, got {requested}")]
    OutOfSequence { expected: usize, requested: usize },

    #[error("Weather series exhausted: step {index} requested, {len} records available")]
    Exhausted { index: usize, len: usize },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<SfError> for ComponentError {
    fn from(e: SfError) -> Self {
        match e {
            SfError::NonFinite { what, value } => ComponentError::NonPhysical { what, value },
            SfError::OutOfRange { what, .. } => ComponentError::InvalidArg { what },
            SfError::InvalidArg { what } => ComponentError::InvalidArg { what },
            SfError::Invariant { what } => ComponentError::Backend {
                message: what.to_string(),
            },
        }
    }
}

impl From<ComponentError> for SfError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what, value } => SfError::NonFinite { what, value },
            ComponentError::NotSupported { what } => SfError::InvalidArg { what },
            ComponentError::InvalidArg { what } => SfError::InvalidArg { what },
            ComponentError::OutOfSequence { .. } => SfError::Invariant {
                what: "weather out of sequence",
            },
            ComponentError::Exhausted { .. } => SfError::Invariant {
                what: "weather exhausted",
            },
            ComponentError::Backend { message: _ } => SfError::InvalidArg {
                what: "backend error",
            },
        }
    }
}
