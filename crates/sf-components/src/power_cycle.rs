//! Design-point Rankine power cycle.

use crate::common::{check_non_negative, check_temperature_c, remaining_step_fraction};
use crate::error::{ComponentError, ComponentResult};
use crate::modes::{PcMode, PcTransitionInput};
use crate::records::{PcOutputs, PcSolvedParams, Permissions};
use crate::traits::PowerCycle;
use serde::{Deserialize, Serialize};
use sf_core::SimInfo;

/// Power-cycle configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerCycleConfig {
    pub name: String,
    /// Design gross electrical output (MW)
    pub w_dot_des_mw: f64,
    /// Design gross efficiency (-)
    pub eta_des: f64,
    pub cycle_max_frac: f64,
    pub cycle_cutoff_frac: f64,
    pub cycle_sb_frac: f64,
    /// Minimum startup duration (hr)
    pub startup_time_hr: f64,
    /// Startup energy, as hours at design thermal input (-)
    pub startup_frac: f64,
    /// Part-load efficiency penalty coefficient (-)
    pub part_load_coeff: f64,
    pub t_htf_cold_des_c: f64,
}

impl Default for PowerCycleConfig {
    fn default() -> Self {
        Self {
            name: "power_cycle".to_string(),
            w_dot_des_mw: 115.0,
            eta_des: 0.412,
            cycle_max_frac: 1.05,
            cycle_cutoff_frac: 0.25,
            cycle_sb_frac: 0.15,
            startup_time_hr: 0.5,
            startup_frac: 0.2,
            part_load_coeff: 0.3,
            t_htf_cold_des_c: 290.0,
        }
    }
}

/// State carried between timesteps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CycleState {
    pub mode: PcMode,
    /// Startup energy accumulated so far (MWh)
    pub startup_energy_mwh: f64,
    /// Startup time accumulated so far (hr)
    pub startup_time_hr: f64,
}

/// Rankine cycle characterised by its design point.
///
/// ## Model
///
/// ```text
/// q_des = W_des / eta_des
/// eta(L) = eta_des * (1 - k * (1 - L)^2),   L = q_used / q_des
/// ```
///
/// Heat above `cycle_max_frac * q_des` is dumped. Below the cutoff the cycle
/// either holds standby at `cycle_sb_frac * q_des` (when permitted and already
/// running) or shuts down. Startup from OFF consumes `startup_frac * q_des`
/// MWh over at least `startup_time_hr`.
#[derive(Clone, Debug)]
pub struct RankineCycle {
    config: PowerCycleConfig,
    state: CycleState,
    pending: Option<CycleState>,
}

impl RankineCycle {
    pub fn new(config: PowerCycleConfig) -> Self {
        Self {
            config,
            state: CycleState::default(),
            pending: None,
        }
    }

    pub fn config(&self) -> &PowerCycleConfig {
        &self.config
    }

    /// Committed state.
    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn q_dot_des_mw(&self) -> f64 {
        self.config.w_dot_des_mw / self.config.eta_des
    }

    /// Gross efficiency at load fraction `load`.
    pub fn efficiency(&self, load: f64) -> f64 {
        let dev = 1.0 - load;
        self.config.eta_des * (1.0 - self.config.part_load_coeff * dev * dev).max(0.0)
    }
}

impl PowerCycle for RankineCycle {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self) -> ComponentResult<()> {
        let c = &self.config;
        if !(c.w_dot_des_mw > 0.0 && c.w_dot_des_mw.is_finite()) {
            return Err(ComponentError::InvalidArg {
                what: "cycle design output must be positive",
            });
        }
        if !(c.eta_des > 0.0 && c.eta_des <= 1.0) {
            return Err(ComponentError::InvalidArg {
                what: "cycle design efficiency must be in (0,1]",
            });
        }
        if !(c.cycle_sb_frac >= 0.0
            && c.cycle_sb_frac <= c.cycle_cutoff_frac
            && c.cycle_cutoff_frac <= c.cycle_max_frac)
        {
            return Err(ComponentError::InvalidArg {
                what: "cycle fractions must satisfy 0 <= standby <= cutoff <= max",
            });
        }
        if c.startup_time_hr < 0.0 || c.startup_frac < 0.0 || c.part_load_coeff < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "cycle startup and part-load coefficients cannot be negative",
            });
        }
        check_temperature_c(c.t_htf_cold_des_c, "design cold HTF temperature")?;
        self.state = CycleState::default();
        self.pending = None;
        Ok(())
    }

    fn design_parameters(&self) -> PcSolvedParams {
        PcSolvedParams {
            w_dot_des_mw: self.config.w_dot_des_mw,
            eta_des: self.config.eta_des,
            q_dot_des_mw: self.q_dot_des_mw(),
            cycle_max_frac: self.config.cycle_max_frac,
            cycle_cutoff_frac: self.config.cycle_cutoff_frac,
            cycle_sb_frac: self.config.cycle_sb_frac,
        }
    }

    fn call(
        &mut self,
        q_thermal_mw: f64,
        permissions: &Permissions,
        sim: &SimInfo,
    ) -> ComponentResult<PcOutputs> {
        check_non_negative(q_thermal_mw, "cycle thermal input")?;

        let q_des = self.q_dot_des_mw();
        let q_max = self.config.cycle_max_frac * q_des;
        let step_hr = sim.step_hours();
        let q_offer = q_thermal_mw.min(q_max);

        let energy_needed = (self.config.startup_frac * q_des - self.state.startup_energy_mwh).max(0.0);
        let time_needed = (self.config.startup_time_hr - self.state.startup_time_hr).max(0.0);
        let startup_complete = q_offer * step_hr >= energy_needed && step_hr >= time_needed;

        let mode = self.state.mode.transition(PcTransitionInput {
            load_frac: q_thermal_mw / q_des,
            cutoff_frac: self.config.cycle_cutoff_frac,
            sb_frac: self.config.cycle_sb_frac,
            startup_allowed: permissions.is_pc_su_allowed,
            standby_allowed: permissions.is_pc_sb_allowed,
            startup_complete,
        });

        let (q_used, w_dot, next) = match mode {
            PcMode::Off => (0.0, 0.0, CycleState::default()),
            PcMode::Standby => (
                self.config.cycle_sb_frac * q_des,
                0.0,
                CycleState {
                    mode,
                    ..CycleState::default()
                },
            ),
            PcMode::Startup => (
                q_offer,
                0.0,
                CycleState {
                    mode,
                    startup_energy_mwh: self.state.startup_energy_mwh + q_offer * step_hr,
                    startup_time_hr: self.state.startup_time_hr + step_hr,
                },
            ),
            PcMode::On => {
                let frac = if self.state.mode.is_running() {
                    1.0
                } else {
                    remaining_step_fraction(energy_needed, q_offer, step_hr)
                        .min(remaining_step_fraction(time_needed, 1.0, step_hr))
                };
                let w = q_offer * self.efficiency(q_offer / q_des) * frac;
                (
                    q_offer,
                    w,
                    CycleState {
                        mode,
                        ..CycleState::default()
                    },
                )
            }
        };

        self.pending = Some(next);

        let eta = if q_used > 0.0 { w_dot / q_used } else { 0.0 };
        Ok(PcOutputs {
            w_dot_mw: w_dot,
            q_dot_in_mw: q_used,
            q_dot_dumped_mw: (q_thermal_mw - q_used).max(0.0),
            t_htf_cold_c: self.config.t_htf_cold_des_c,
            eta,
            mode,
        })
    }

    fn converged(&mut self, sim: &SimInfo) -> ComponentResult<()> {
        let next = self.pending.take().ok_or(ComponentError::InvalidArg {
            what: "power cycle converged() without a preceding call()",
        })?;
        if next.mode != self.state.mode {
            tracing::debug!(
                cycle = %self.config.name,
                time_s = sim.time_s,
                from = %self.state.mode,
                to = %next.mode,
                "power cycle mode change"
            );
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> SimInfo {
        let mut s = SimInfo::new(3600.0).unwrap();
        s.set_step_index(0);
        s
    }

    fn cycle() -> RankineCycle {
        let mut pc = RankineCycle::new(PowerCycleConfig::default());
        pc.init().unwrap();
        pc
    }

    fn run(pc: &mut RankineCycle, q: f64, perms: Permissions) -> PcOutputs {
        let out = pc.call(q, &perms, &sim()).unwrap();
        pc.converged(&sim()).unwrap();
        out
    }

    #[test]
    fn design_point() {
        let pc = cycle();
        let p = pc.design_parameters();
        assert!((p.q_dot_des_mw - 115.0 / 0.412).abs() < 1e-9);
        assert!((pc.efficiency(1.0) - 0.412).abs() < 1e-12);
        assert!(pc.efficiency(0.5) < 0.412);
    }

    #[test]
    fn starts_then_runs_at_design() {
        let mut pc = cycle();
        let q_des = pc.q_dot_des_mw();
        let first = run(&mut pc, q_des, Permissions::default());
        // Startup (0.5 hr, 0.2 hr of design heat) completes inside the first hour
        assert_eq!(first.mode, PcMode::On);
        assert!(first.w_dot_mw > 0.0 && first.w_dot_mw < 115.0);

        let second = run(&mut pc, q_des, Permissions::default());
        assert!((second.w_dot_mw - 115.0).abs() < 1e-9);
        assert_eq!(second.q_dot_dumped_mw, 0.0);
    }

    #[test]
    fn excess_heat_is_dumped() {
        let mut pc = cycle();
        let q_des = pc.q_dot_des_mw();
        run(&mut pc, q_des, Permissions::default());
        let out = run(&mut pc, 2.0 * q_des, Permissions::default());
        assert!((out.q_dot_in_mw - 1.05 * q_des).abs() < 1e-9);
        assert!((out.q_dot_dumped_mw - 0.95 * q_des).abs() < 1e-9);
    }

    #[test]
    fn startup_blocked_without_permission() {
        let mut pc = cycle();
        let perms = Permissions {
            is_pc_su_allowed: false,
            ..Permissions::default()
        };
        let q_des = pc.q_dot_des_mw();
        let out = run(&mut pc, q_des, perms);
        assert_eq!(out.mode, PcMode::Off);
        assert_eq!(out.w_dot_mw, 0.0);
        assert_eq!(out.q_dot_dumped_mw, q_des);
    }

    #[test]
    fn standby_below_cutoff() {
        let mut pc = cycle();
        let q_des = pc.q_dot_des_mw();
        run(&mut pc, q_des, Permissions::default());
        let out = run(&mut pc, 0.2 * q_des, Permissions::default());
        assert_eq!(out.mode, PcMode::Standby);
        assert_eq!(out.w_dot_mw, 0.0);
        assert!((out.q_dot_in_mw - 0.15 * q_des).abs() < 1e-9);

        let no_sb = Permissions {
            is_pc_sb_allowed: false,
            ..Permissions::default()
        };
        let off = run(&mut pc, 0.2 * q_des, no_sb);
        assert_eq!(off.mode, PcMode::Off);
    }

    #[test]
    fn negative_heat_is_non_physical() {
        let mut pc = cycle();
        let err = pc.call(-1.0, &Permissions::default(), &sim()).unwrap_err();
        assert!(matches!(err, ComponentError::NonPhysical { .. }));
    }

    #[test]
    fn init_rejects_standby_above_cutoff() {
        let mut pc = RankineCycle::new(PowerCycleConfig {
            cycle_sb_frac: 0.5,
            ..PowerCycleConfig::default()
        });
        assert!(pc.init().is_err());
    }
}
