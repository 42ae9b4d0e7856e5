//! Per-timestep results and run diagnostics.

use serde::{Deserialize, Serialize};
use sf_components::{CrMode, CrSolvedParams, PcMode, PcSolvedParams, Permissions};

/// Design values cached by `CspSolver::init`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignPoint {
    pub receiver: CrSolvedParams,
    pub cycle: PcSolvedParams,
}

/// Outputs of one converged timestep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimestepRecord {
    /// 0-based step index
    pub hour: usize,
    /// Simulation time at the end of the step (s)
    pub time_s: f64,
    /// Field-control fraction the receiver ran at
    pub field_control: f64,
    /// Receiver thermal output (MW)
    pub q_rec_mw: f64,
    /// Receiver heat spent on startup (MW)
    pub q_rec_startup_mw: f64,
    /// Thermal power used by the power cycle (MW)
    pub q_pc_in_mw: f64,
    /// Thermal power the cycle could not use (MW)
    pub q_dumped_mw: f64,
    /// Gross electrical output (MW)
    pub w_dot_mw: f64,
    pub cr_mode: CrMode,
    pub pc_mode: PcMode,
    /// Permissions in force during the step
    pub permissions: Permissions,
    /// Receiver evaluations spent on the defocus search
    pub iterations: usize,
    pub converged: bool,
}

/// Non-fatal events raised during a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SimDiagnostic {
    /// The defocus search hit its cap or could not reach the target; the
    /// last iterate was accepted.
    ConvergenceWarning {
        hour: usize,
        time_s: f64,
        mismatch_mw: f64,
        iterations: usize,
        field_control: f64,
    },
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimRun {
    pub design: DesignPoint,
    pub records: Vec<TimestepRecord>,
    pub diagnostics: Vec<SimDiagnostic>,
}

impl SimRun {
    pub fn convergence_warnings(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, SimDiagnostic::ConvergenceWarning { .. }))
            .count()
    }
}

/// Progress snapshot passed to the observer after every timestep.
#[derive(Clone, Copy, Debug)]
pub struct SimProgress {
    /// Timesteps completed
    pub step: usize,
    pub n_steps: usize,
    pub time_s: f64,
    pub warnings: usize,
}

impl SimProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.n_steps == 0 {
            1.0
        } else {
            self.step as f64 / self.n_steps as f64
        }
    }
}
