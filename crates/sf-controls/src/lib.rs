//! Operating permissions for the CSP plant controller.
//!
//! The solver owns three permission flags (receiver startup, power-cycle
//! startup, power-cycle standby) and recomputes them after every timestep
//! from the modes the components settled in. The rule that does so is a
//! pluggable [`PermissionPolicy`]; plant-specific transition rules live in
//! policy implementations rather than in the solver loop.
//!
//! # Policies
//!
//! - [`AlwaysAllow`]: every transition is permitted every step
//! - [`StandardPolicy`]: restart cooldowns after shutdowns and a cap on
//!   consecutive standby time

pub mod error;
pub mod policy;

pub use error::{ControlError, ControlResult};
pub use policy::{
    AlwaysAllow, PermissionPolicy, PolicyContext, StandardPolicy, StandardPolicyConfig,
};
pub use sf_components::Permissions;
