//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use sf_core::numeric::ensure_finite;
use sf_core::units::KELVIN_OFFSET;

/// Thermal powers below this are treated as zero (MW)
pub const EPSILON_POWER_MW: f64 = 1e-9;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what, value })
}

/// Finite and not negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ComponentResult<f64> {
    check_finite(value, what)?;
    if value < 0.0 {
        return Err(ComponentError::NonPhysical { what, value });
    }
    Ok(value)
}

/// Celsius temperature that maps to a positive absolute temperature.
pub fn check_temperature_c(t_c: f64, what: &'static str) -> ComponentResult<f64> {
    check_finite(t_c, what)?;
    if t_c + KELVIN_OFFSET <= 0.0 {
        return Err(ComponentError::NonPhysical { what, value: t_c });
    }
    Ok(t_c)
}

/// Portion of a step left over once `needed` units of a resource are drawn at
/// `rate` per hour, given `step_hr` hours in the step.
pub(crate) fn remaining_step_fraction(needed: f64, rate: f64, step_hr: f64) -> f64 {
    if needed <= 0.0 {
        return 1.0;
    }
    if rate <= 0.0 || step_hr <= 0.0 {
        return 0.0;
    }
    (1.0 - needed / (rate * step_hr)).clamp(0.0, 1.0)
}
