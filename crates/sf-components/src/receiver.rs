//! Lumped central-receiver model.

use crate::common::{EPSILON_POWER_MW, check_non_negative, check_temperature_c, remaining_step_fraction};
use crate::error::{ComponentError, ComponentResult};
use crate::modes::{CrMode, CrTransitionInput};
use crate::records::{CrInputs, CrOutputs, CrSolvedParams, HtfState, WeatherOutputs};
use crate::traits::CollectorReceiver;
use serde::{Deserialize, Serialize};
use sf_core::SimInfo;
use sf_core::units::{Power, as_mw, c_to_k, m2, w_per_m2};

/// Receiver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub name: String,
    /// Design thermal output to the HTF (MW)
    pub q_rec_des_mw: f64,
    /// Heliostat reflective area (m²)
    pub aperture_m2: f64,
    /// Field-to-receiver optical efficiency, absorptance included (-)
    pub eta_optical: f64,
    /// Thermal loss at design temperatures, fraction of design output (-)
    pub loss_frac: f64,
    /// Minimum net output for operation, fraction of design (-)
    pub f_rec_min: f64,
    /// Maximum net output, fraction of design (-)
    pub f_rec_max: f64,
    /// Minimum startup duration (hr)
    pub startup_time_hr: f64,
    /// Startup energy, as hours at design output (-)
    pub startup_energy_frac: f64,
    pub t_htf_cold_des_c: f64,
    pub t_htf_hot_des_c: f64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            name: "receiver".to_string(),
            q_rec_des_mw: 360.0,
            aperture_m2: 700_000.0,
            eta_optical: 0.55,
            loss_frac: 0.05,
            f_rec_min: 0.25,
            f_rec_max: 1.2,
            startup_time_hr: 0.2,
            startup_energy_frac: 0.25,
            t_htf_cold_des_c: 290.0,
            t_htf_hot_des_c: 574.0,
        }
    }
}

/// State carried between timesteps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReceiverState {
    pub mode: CrMode,
    /// Startup energy accumulated so far (MWh)
    pub startup_energy_mwh: f64,
    /// Startup time accumulated so far (hr)
    pub startup_time_hr: f64,
}

/// Central receiver fed by a heliostat field.
///
/// ## Model
///
/// ```text
/// q_abs  = DNI * A * eta_opt * fc            (sun up)
/// q_loss = loss_frac * q_des * dT / dT_des   (dT = mean HTF temp - ambient)
/// q_net  = min(q_abs - q_loss, f_rec_max * q_des)
/// ```
///
/// The receiver runs only when `q_net >= f_rec_min * q_des`. Coming from OFF
/// it first accumulates `startup_energy_frac * q_des` MWh over at least
/// `startup_time_hr`; heat left in the step after startup completes is
/// delivered.
#[derive(Clone, Debug)]
pub struct TowerReceiver {
    config: ReceiverConfig,
    state: ReceiverState,
    pending: Option<ReceiverState>,
}

impl TowerReceiver {
    pub fn new(config: ReceiverConfig) -> Self {
        Self {
            config,
            state: ReceiverState::default(),
            pending: None,
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Committed state.
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    fn design_dt(&self) -> f64 {
        0.5 * (self.config.t_htf_cold_des_c + self.config.t_htf_hot_des_c) - 25.0
    }

    /// Net thermal power the field can put into the HTF (MW), before
    /// turndown limits.
    fn net_power_mw(&self, weather: &WeatherOutputs, htf_in: &HtfState, fc: f64) -> f64 {
        if !weather.is_sun_up() || weather.dni_w_m2 <= 0.0 || fc <= 0.0 {
            return 0.0;
        }
        let incident: Power = w_per_m2(weather.dni_w_m2) * m2(self.config.aperture_m2);
        let q_abs = as_mw(incident) * self.config.eta_optical * fc;
        let t_mean = 0.5 * (htf_in.temp_in_c + self.config.t_htf_hot_des_c);
        let dt_ratio = ((t_mean - weather.tdry_c) / self.design_dt()).max(0.0);
        let q_loss = self.config.loss_frac * self.config.q_rec_des_mw * dt_ratio;
        (q_abs - q_loss).max(0.0)
    }
}

impl CollectorReceiver for TowerReceiver {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self) -> ComponentResult<()> {
        let c = &self.config;
        if c.q_rec_des_mw <= 0.0 || !c.q_rec_des_mw.is_finite() {
            return Err(ComponentError::InvalidArg {
                what: "receiver design output must be positive",
            });
        }
        if c.aperture_m2 <= 0.0 || !c.aperture_m2.is_finite() {
            return Err(ComponentError::InvalidArg {
                what: "receiver aperture must be positive",
            });
        }
        if !(c.eta_optical > 0.0 && c.eta_optical <= 1.0) {
            return Err(ComponentError::InvalidArg {
                what: "optical efficiency must be in (0,1]",
            });
        }
        if !(0.0..1.0).contains(&c.loss_frac) {
            return Err(ComponentError::InvalidArg {
                what: "loss fraction must be in [0,1)",
            });
        }
        if !(c.f_rec_min >= 0.0 && c.f_rec_min <= c.f_rec_max) {
            return Err(ComponentError::InvalidArg {
                what: "receiver turndown must satisfy 0 <= min <= max",
            });
        }
        if c.startup_time_hr < 0.0 || c.startup_energy_frac < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "receiver startup requirements cannot be negative",
            });
        }
        check_temperature_c(c.t_htf_cold_des_c, "design cold HTF temperature")?;
        check_temperature_c(c.t_htf_hot_des_c, "design hot HTF temperature")?;
        if c.t_htf_hot_des_c <= c.t_htf_cold_des_c {
            return Err(ComponentError::InvalidArg {
                what: "hot HTF temperature must exceed cold HTF temperature",
            });
        }
        self.state = ReceiverState::default();
        self.pending = None;
        Ok(())
    }

    fn design_parameters(&self) -> CrSolvedParams {
        CrSolvedParams {
            t_htf_cold_des_k: c_to_k(self.config.t_htf_cold_des_c),
            q_rec_des_mw: self.config.q_rec_des_mw,
        }
    }

    fn call(
        &mut self,
        weather: &WeatherOutputs,
        htf_in: &HtfState,
        inputs: &CrInputs,
        sim: &SimInfo,
    ) -> ComponentResult<CrOutputs> {
        check_temperature_c(htf_in.temp_in_c, "HTF inlet temperature")?;
        check_non_negative(weather.dni_w_m2, "DNI")?;
        check_temperature_c(weather.tdry_c, "dry-bulb temperature")?;

        let fc = inputs.field_control.clamp(0.0, 1.0);
        let q_des = self.config.q_rec_des_mw;
        let q_net = self
            .net_power_mw(weather, htf_in, fc)
            .min(self.config.f_rec_max * q_des);
        let step_hr = sim.step_hours();

        let energy_needed = (self.config.startup_energy_frac * q_des - self.state.startup_energy_mwh).max(0.0);
        let time_needed = (self.config.startup_time_hr - self.state.startup_time_hr).max(0.0);
        let startup_complete = q_net * step_hr >= energy_needed && step_hr >= time_needed;

        let mode = self.state.mode.transition(CrTransitionInput {
            available: q_net > EPSILON_POWER_MW && q_net >= self.config.f_rec_min * q_des,
            startup_allowed: fc > 0.0,
            startup_complete,
            defocused: fc < 1.0,
        });

        let (q_thermal, q_startup, next) = match mode {
            CrMode::Off => (0.0, 0.0, ReceiverState::default()),
            CrMode::Startup => (
                0.0,
                q_net,
                ReceiverState {
                    mode,
                    startup_energy_mwh: self.state.startup_energy_mwh + q_net * step_hr,
                    startup_time_hr: self.state.startup_time_hr + step_hr,
                },
            ),
            CrMode::On | CrMode::Defocus => {
                let running = ReceiverState {
                    mode,
                    ..ReceiverState::default()
                };
                if self.state.mode.is_producing() {
                    (q_net, 0.0, running)
                } else {
                    // Startup finished inside this step
                    let frac = remaining_step_fraction(energy_needed, q_net, step_hr)
                        .min(remaining_step_fraction(time_needed, 1.0, step_hr));
                    (q_net * frac, q_net * (1.0 - frac), running)
                }
            }
        };

        self.pending = Some(next);

        let htf_temp_out_c = if mode.is_producing() {
            self.config.t_htf_hot_des_c
        } else {
            htf_in.temp_in_c
        };

        Ok(CrOutputs {
            q_thermal_mw: q_thermal,
            q_startup_mw: q_startup,
            htf_temp_out_c,
            mode,
        })
    }

    fn converged(&mut self, sim: &SimInfo) -> ComponentResult<()> {
        let next = self.pending.take().ok_or(ComponentError::InvalidArg {
            what: "receiver converged() without a preceding call()",
        })?;
        if next.mode != self.state.mode {
            tracing::debug!(
                receiver = %self.config.name,
                time_s = sim.time_s,
                from = %self.state.mode,
                to = %next.mode,
                "receiver mode change"
            );
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sunny() -> WeatherOutputs {
        WeatherOutputs {
            dni_w_m2: 900.0,
            ghi_w_m2: 950.0,
            dhi_w_m2: 90.0,
            tdry_c: 25.0,
            wspd_m_s: 3.0,
            solar_zenith_deg: 20.0,
        }
    }

    fn htf() -> HtfState {
        HtfState { temp_in_c: 290.0 }
    }

    fn sim() -> SimInfo {
        let mut s = SimInfo::new(3600.0).unwrap();
        s.set_step_index(0);
        s
    }

    fn full() -> CrInputs {
        CrInputs { field_control: 1.0 }
    }

    fn receiver() -> TowerReceiver {
        let mut rec = TowerReceiver::new(ReceiverConfig::default());
        rec.init().unwrap();
        rec
    }

    #[test]
    fn design_parameters_in_kelvin() {
        let rec = receiver();
        let p = rec.design_parameters();
        assert!((p.t_htf_cold_des_k - 563.15).abs() < 1e-9);
        assert_eq!(p.q_rec_des_mw, 360.0);
    }

    #[test]
    fn first_sunny_hour_completes_startup_and_delivers_remainder() {
        let mut rec = receiver();
        let out = rec.call(&sunny(), &htf(), &full(), &sim()).unwrap();
        assert_eq!(out.mode, CrMode::On);
        assert!(out.q_startup_mw > 0.0);
        assert!(out.q_thermal_mw > 0.0);
        assert_eq!(out.htf_temp_out_c, 574.0);
    }

    #[test]
    fn call_does_not_commit_state() {
        let mut rec = receiver();
        rec.call(&sunny(), &htf(), &full(), &sim()).unwrap();
        assert_eq!(rec.state().mode, CrMode::Off);
        rec.converged(&sim()).unwrap();
        assert_eq!(rec.state().mode, CrMode::On);
        assert!(rec.converged(&sim()).is_err());
    }

    #[test]
    fn output_is_monotone_in_field_control() {
        let mut rec = receiver();
        rec.call(&sunny(), &htf(), &full(), &sim()).unwrap();
        rec.converged(&sim()).unwrap();

        let mut last = 0.0;
        for fc in [0.4, 0.6, 0.8, 1.0] {
            let out = rec
                .call(&sunny(), &htf(), &CrInputs { field_control: fc }, &sim())
                .unwrap();
            assert!(out.q_thermal_mw >= last);
            last = out.q_thermal_mw;
        }
        let partial = rec
            .call(&sunny(), &htf(), &CrInputs { field_control: 0.8 }, &sim())
            .unwrap();
        assert_eq!(partial.mode, CrMode::Defocus);
    }

    #[test]
    fn output_capped_at_max_fraction() {
        let mut rec = receiver();
        let bright = WeatherOutputs {
            dni_w_m2: 2000.0,
            ..sunny()
        };
        rec.call(&bright, &htf(), &full(), &sim()).unwrap();
        rec.converged(&sim()).unwrap();
        let out = rec.call(&bright, &htf(), &full(), &sim()).unwrap();
        assert!((out.q_thermal_mw - 1.2 * 360.0).abs() < 1e-9);
    }

    #[test]
    fn night_turns_receiver_off() {
        let mut rec = receiver();
        let out = rec.call(&WeatherOutputs::night(10.0), &htf(), &full(), &sim()).unwrap();
        assert_eq!(out.mode, CrMode::Off);
        assert_eq!(out.q_thermal_mw, 0.0);
        assert_eq!(out.htf_temp_out_c, 290.0);
    }

    #[test]
    fn zero_field_control_blocks_startup() {
        let mut rec = receiver();
        let out = rec
            .call(&sunny(), &htf(), &CrInputs { field_control: 0.0 }, &sim())
            .unwrap();
        assert_eq!(out.mode, CrMode::Off);
    }

    #[test]
    fn long_startup_spans_steps() {
        let mut rec = TowerReceiver::new(ReceiverConfig {
            startup_time_hr: 1.5,
            ..ReceiverConfig::default()
        });
        rec.init().unwrap();
        let first = rec.call(&sunny(), &htf(), &full(), &sim()).unwrap();
        assert_eq!(first.mode, CrMode::Startup);
        assert_eq!(first.q_thermal_mw, 0.0);
        rec.converged(&sim()).unwrap();
        let second = rec.call(&sunny(), &htf(), &full(), &sim()).unwrap();
        assert_eq!(second.mode, CrMode::On);
        // Half of the second hour is still startup
        assert!((second.q_thermal_mw - 0.5 * (second.q_thermal_mw + second.q_startup_mw)).abs() < 1e-6);
    }

    #[test]
    fn negative_absolute_temperature_is_rejected() {
        let mut rec = receiver();
        let err = rec
            .call(&sunny(), &HtfState { temp_in_c: -280.0 }, &full(), &sim())
            .unwrap_err();
        assert!(matches!(err, ComponentError::NonPhysical { .. }));
    }

    #[test]
    fn init_rejects_inverted_temperatures() {
        let mut rec = TowerReceiver::new(ReceiverConfig {
            t_htf_hot_des_c: 250.0,
            ..ReceiverConfig::default()
        });
        assert!(rec.init().is_err());
    }
}
