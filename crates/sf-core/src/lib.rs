//! sf-core: shared foundation for solarflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - sim_info (simulation clock shared by every component in a timestep)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod sim_info;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SfError, SfResult};
pub use numeric::*;
pub use sim_info::SimInfo;
pub use units::*;
