//! Result data types.

use crate::summary::{AnnualSummary, PvSummary};
use serde::{Deserialize, Serialize};
use sf_pv::PvWattsOutputs;
use sf_sim::{DesignPoint, SimDiagnostic, TimestepRecord};

pub type RunId = String;

/// Version string recorded with every run and folded into its id.
pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    pub run_type: RunType,
    pub solver_version: String,
}

impl RunManifest {
    /// Manifest stamped with the current time.
    pub fn new(run_id: RunId, scenario_name: impl Into<String>, run_type: RunType) -> Self {
        Self {
            run_id,
            scenario_name: scenario_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            run_type,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunType {
    Csp { step_s: f64, n_steps: usize },
    PvWatts { step_s: f64, steps: usize },
}

/// Everything a CSP run produced, written as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspRunBundle {
    pub manifest: RunManifest,
    pub summary: AnnualSummary,
    pub design: DesignPoint,
    pub records: Vec<TimestepRecord>,
    pub diagnostics: Vec<SimDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvRunBundle {
    pub manifest: RunManifest,
    pub summary: PvSummary,
    pub outputs: PvWattsOutputs,
}
