//! Simulation options.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use sf_core::sim_info::HOURS_PER_YEAR;
use sf_solver::DefocusConfig;

/// Options for a CSP run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub step_s: f64,
    /// Number of timesteps; a full year unless shortened for tests
    pub n_steps: usize,
    pub defocus: DefocusConfig,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            step_s: 3600.0,
            n_steps: HOURS_PER_YEAR,
            defocus: DefocusConfig::default(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.step_s.is_finite() && self.step_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "step_s must be positive",
            });
        }
        if self.n_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "n_steps must be positive",
            });
        }
        self.defocus.validate().map_err(|e| SimError::Configuration {
            what: e.to_string(),
        })
    }
}
