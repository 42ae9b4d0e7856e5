//! Error types for the CSP simulation loop.

use crate::record::{SimDiagnostic, TimestepRecord};
use sf_components::ComponentError;
use thiserror::Error;

/// Fatal conditions that stop a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Component '{component}' failed to initialise: {message}")]
    ComponentInit { component: String, message: String },

    #[error("Component '{component}' failed at hour {hour}: {message}")]
    Component {
        hour: usize,
        component: String,
        message: String,
    },

    #[error("Physical invariant violated at hour {hour} by '{component}': {what} = {value}")]
    PhysicalInvariant {
        hour: usize,
        component: String,
        what: &'static str,
        value: f64,
    },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Attribute a component failure to a timestep.
    pub fn from_component(hour: usize, component: &str, e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what, value } => SimError::PhysicalInvariant {
                hour,
                component: component.to_string(),
                what,
                value,
            },
            other => SimError::Component {
                hour,
                component: component.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Attribute a component failure during `init()`.
    pub fn from_init(component: &str, e: ComponentError) -> Self {
        SimError::ComponentInit {
            component: component.to_string(),
            message: e.to_string(),
        }
    }

    /// Hour of the failing timestep, if the error happened inside the loop.
    pub fn hour(&self) -> Option<usize> {
        match self {
            SimError::Component { hour, .. } | SimError::PhysicalInvariant { hour, .. } => {
                Some(*hour)
            }
            _ => None,
        }
    }
}

impl From<sf_solver::SolverError> for SimError {
    fn from(e: sf_solver::SolverError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sf_core::SfError> for SimError {
    fn from(e: sf_core::SfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

/// A run that stopped on a fatal error.
///
/// Holds the records of every timestep completed before the failure and the
/// diagnostics collected up to that point. Nothing after the failing step is
/// present.
#[derive(Error, Debug, Clone)]
#[error("{error} ({n} timesteps completed)", n = .records.len())]
pub struct SimFailure {
    #[source]
    pub error: SimError,
    pub records: Vec<TimestepRecord>,
    pub diagnostics: Vec<SimDiagnostic>,
}

impl SimFailure {
    pub fn new(error: SimError) -> Self {
        Self {
            error,
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_physical_maps_to_invariant() {
        let e = SimError::from_component(
            12,
            "receiver",
            ComponentError::NonPhysical {
                what: "HTF inlet temperature",
                value: -400.0,
            },
        );
        assert_eq!(e.hour(), Some(12));
        assert!(matches!(e, SimError::PhysicalInvariant { value, .. } if value == -400.0));
    }

    #[test]
    fn other_component_errors_keep_message() {
        let e = SimError::from_component(3, "weather", ComponentError::Exhausted { index: 3, len: 3 });
        match e {
            SimError::Component { component, message, .. } => {
                assert_eq!(component, "weather");
                assert!(message.contains("exhausted"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failure_display_counts_records() {
        let f = SimFailure::new(SimError::InvalidArg { what: "x" });
        assert!(f.to_string().contains("0 timesteps completed"));
    }
}
