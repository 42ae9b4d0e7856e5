//! Simulation clock shared by every component during a timestep.

use crate::error::{SfError, SfResult};

/// Hours in a (non-leap) simulation year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Current simulation time and step size.
///
/// `time_s` marks the END of the current step, so the first hourly step of
/// the year has `time_s == 3600`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimInfo {
    /// Elapsed time at the end of the step (seconds)
    pub time_s: f64,
    /// Step duration (seconds)
    pub step_s: f64,
}

impl SimInfo {
    pub fn new(step_s: f64) -> SfResult<Self> {
        if !step_s.is_finite() || step_s <= 0.0 {
            return Err(SfError::InvalidArg {
                what: "step must be positive and finite",
            });
        }
        Ok(Self {
            time_s: 0.0,
            step_s,
        })
    }

    /// Move the clock to the end of the 0-based step `index`.
    pub fn set_step_index(&mut self, index: usize) {
        self.time_s = self.step_s * (index + 1) as f64;
    }

    /// 0-based index of the step ending at `time_s`.
    pub fn step_index(&self) -> usize {
        let steps = (self.time_s / self.step_s).round();
        if steps < 1.0 { 0 } else { steps as usize - 1 }
    }

    /// Step duration in hours.
    pub fn step_hours(&self) -> f64 {
        self.step_s / 3600.0
    }

    /// Start of the step (seconds).
    pub fn step_start_s(&self) -> f64 {
        self.time_s - self.step_s
    }
}
