//! Bounded field-control iteration for the CSP timestep.
//!
//! When the power cycle cannot take what the receiver offers, the receiver is
//! re-solved at a reduced field-control fraction. [`solve_defocus`] searches
//! that fraction with a bracketed secant (Illinois) method, a bisection
//! fallback, a hard iteration cap and a thermal-power tolerance. Running out
//! of iterations is reported through [`DefocusResult::converged`], not as an
//! error.

pub mod defocus;
pub mod error;

pub use defocus::{DefocusConfig, DefocusProblem, DefocusResult, solve_defocus};
pub use error::{SolverError, SolverResult};
