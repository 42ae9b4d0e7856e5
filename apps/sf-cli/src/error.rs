//! Error type for the command-line front end.

use sf_controls::ControlError;
use sf_project::ProjectError;
use sf_pv::PvError;
use sf_results::ResultsError;
use sf_sim::{SimError, SimFailure};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] ProjectError),

    #[error("Scenario has no {section} section")]
    MissingSection { section: &'static str },

    #[error("Policy error: {0}")]
    Policy(#[from] ControlError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Simulation failed: {0}")]
    SimulationFailed(#[from] Box<SimFailure>),

    #[error("PVWatts error: {0}")]
    Pv(#[from] PvError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
