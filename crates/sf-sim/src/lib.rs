//! Time-stepped simulation of a concentrating-solar-power plant.
//!
//! [`CspSolver`] drives a weather source, a collector/receiver and a power
//! cycle through a fixed series of timesteps (a full hourly year by default):
//!
//! 1. advance the clock and fetch the weather record
//! 2. run the receiver at the field-control fraction the permissions allow
//! 3. if the power cycle cannot take that heat, defocus the receiver with a
//!    bounded search; a search that does not converge is a warning, not an
//!    error
//! 4. run the power cycle, commit both components, update permissions
//!
//! Component failures and non-physical outputs stop the run with a
//! [`SimFailure`] that keeps every record completed before the failure.

pub mod error;
pub mod options;
pub mod record;
pub mod solver;

pub use error::{SimError, SimFailure, SimResult};
pub use options::SimOptions;
pub use record::{DesignPoint, SimDiagnostic, SimProgress, SimRun, TimestepRecord};
pub use solver::{Acceptance, CspSolver};
