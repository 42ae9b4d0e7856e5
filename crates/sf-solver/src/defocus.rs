//! Field-control (defocus) search.

use crate::error::{SolverError, SolverResult};
use serde::{Deserialize, Serialize};

/// Defocus iteration configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefocusConfig {
    /// Maximum receiver evaluations per timestep
    pub max_iterations: usize,
    /// Absolute tolerance on thermal-power mismatch (MW)
    pub abs_tol_mw: f64,
    /// Tolerance relative to the cycle design thermal input (-)
    pub rel_tol: f64,
}

impl Default for DefocusConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            abs_tol_mw: 1e-3,
            rel_tol: 1e-4,
        }
    }
}

impl DefocusConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                what: "max_iterations must be at least 1",
            });
        }
        if !(self.abs_tol_mw.is_finite() && self.abs_tol_mw >= 0.0) {
            return Err(SolverError::InvalidConfig {
                what: "abs_tol_mw must be finite and non-negative",
            });
        }
        if !(self.rel_tol.is_finite() && self.rel_tol >= 0.0) {
            return Err(SolverError::InvalidConfig {
                what: "rel_tol must be finite and non-negative",
            });
        }
        if self.abs_tol_mw == 0.0 && self.rel_tol == 0.0 {
            return Err(SolverError::InvalidConfig {
                what: "at least one tolerance must be positive",
            });
        }
        Ok(())
    }

    /// Mismatch tolerance (MW) for a plant of the given thermal scale.
    pub fn tolerance_mw(&self, scale_mw: f64) -> f64 {
        self.abs_tol_mw.max(self.rel_tol * scale_mw.abs())
    }
}

/// One defocus search.
///
/// The caller has already evaluated the receiver at `fc_hi` and found it
/// delivering `q_hi_mw`, more than `target_mw`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefocusProblem {
    /// Upper end of the search interval, in (0, 1]
    pub fc_hi: f64,
    /// Receiver output at `fc_hi` (MW)
    pub q_hi_mw: f64,
    /// Thermal power the power cycle can accept (MW)
    pub target_mw: f64,
    /// Scale for the relative tolerance, usually the cycle design input (MW)
    pub scale_mw: f64,
}

impl DefocusProblem {
    fn validate(&self) -> SolverResult<()> {
        if !(self.fc_hi > 0.0 && self.fc_hi <= 1.0) {
            return Err(SolverError::InvalidProblem {
                what: "fc_hi must be in (0, 1]",
            });
        }
        if !self.q_hi_mw.is_finite() {
            return Err(SolverError::NonFinite {
                field_control: self.fc_hi,
                value: self.q_hi_mw,
            });
        }
        if !(self.target_mw.is_finite() && self.target_mw >= 0.0) {
            return Err(SolverError::InvalidProblem {
                what: "target must be finite and non-negative",
            });
        }
        if !self.scale_mw.is_finite() {
            return Err(SolverError::InvalidProblem {
                what: "scale must be finite",
            });
        }
        Ok(())
    }
}

/// Outcome of a defocus search.
///
/// `field_control` is always the last point handed to the evaluator, so a
/// stateful receiver's pending state matches the reported result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefocusResult {
    pub field_control: f64,
    /// Receiver output at `field_control` (MW)
    pub q_mw: f64,
    /// `q_mw - target` (MW)
    pub mismatch_mw: f64,
    /// Evaluations spent by the search
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    None,
    Lo,
    Hi,
}

/// Search `[0, fc_hi]` for the field-control fraction whose receiver output
/// matches `target_mw`.
///
/// A converged result never falls short of the target: the output lands in
/// `[target, target + tol]`, so a cycle asked to hold a threshold load (such
/// as standby) is never handed slightly less than that threshold.
///
/// Receiver output is assumed non-decreasing in field control. Each step
/// takes the regula-falsi point of the current bracket, with the Illinois
/// modification to avoid one-sided stalls, and falls back to bisection when
/// that point is not strictly inside the bracket.
///
/// Returns without error when the cap is reached or the target is out of
/// reach; `converged` is false in that case and the last iterate is kept.
/// Errors from `eval` propagate unchanged.
pub fn solve_defocus<F, E>(
    config: &DefocusConfig,
    problem: DefocusProblem,
    mut eval: F,
) -> Result<DefocusResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    config.validate()?;
    problem.validate()?;

    let tol = config.tolerance_mw(problem.scale_mw);
    let target = problem.target_mw;
    // Accepted window is [target, target + tol]; aim at its middle
    let half = 0.5 * tol;
    let aim = target + half;
    let result = |fc: f64, q: f64, iterations: usize| DefocusResult {
        field_control: fc,
        q_mw: q,
        mismatch_mw: q - target,
        iterations,
        converged: (q - aim).abs() <= half,
    };

    // Nothing to reduce
    if problem.q_hi_mw - target <= tol {
        return Ok(DefocusResult {
            converged: true,
            ..result(problem.fc_hi, problem.q_hi_mw, 0)
        });
    }

    let mut evaluate = |fc: f64| -> Result<f64, E> {
        let q = eval(fc)?;
        if !q.is_finite() {
            return Err(SolverError::NonFinite {
                field_control: fc,
                value: q,
            }
            .into());
        }
        Ok(q)
    };

    let q0 = evaluate(0.0)?;
    let mut iterations = 1;
    let mut last = result(0.0, q0, iterations);
    if last.converged || q0 > aim {
        // Either fully defocused hits the target or field control has no
        // effect on the output
        if !last.converged {
            tracing::debug!(q0_mw = q0, target_mw = target, "target below zero-focus output");
        }
        return Ok(last);
    }

    let (mut x_lo, mut f_lo) = (0.0, q0 - aim);
    let (mut x_hi, mut f_hi) = (problem.fc_hi, problem.q_hi_mw - aim);
    let mut side = Side::None;

    while iterations < config.max_iterations {
        let secant = (x_lo * f_hi - x_hi * f_lo) / (f_hi - f_lo);
        let x = if secant.is_finite() && secant > x_lo && secant < x_hi {
            secant
        } else {
            0.5 * (x_lo + x_hi)
        };

        let q = evaluate(x)?;
        iterations += 1;
        last = result(x, q, iterations);
        if last.converged {
            break;
        }

        let fx = q - aim;
        if fx > 0.0 {
            x_hi = x;
            f_hi = fx;
            if side == Side::Hi {
                f_lo *= 0.5;
            }
            side = Side::Hi;
        } else {
            x_lo = x;
            f_lo = fx;
            if side == Side::Lo {
                f_hi *= 0.5;
            }
            side = Side::Lo;
        }

        // Bracket collapsed onto a jump in the output
        if x_hi - x_lo <= f64::EPSILON {
            break;
        }
    }

    tracing::debug!(
        field_control = last.field_control,
        mismatch_mw = last.mismatch_mw,
        iterations = last.iterations,
        converged = last.converged,
        "defocus search finished"
    );
    Ok(last)
}
