//! The CSP plant timestep loop.

use crate::error::{SimError, SimFailure, SimResult};
use crate::options::SimOptions;
use crate::record::{DesignPoint, SimDiagnostic, SimProgress, SimRun, TimestepRecord};
use sf_components::{
    CollectorReceiver, CrInputs, CrMode, CrOutputs, HtfState, PcMode, PcOutputs, PcSolvedParams,
    Permissions, PowerCycle, WeatherOutputs, WeatherSource,
};
use sf_controls::{AlwaysAllow, PermissionPolicy, PolicyContext};
use sf_core::SimInfo;
use sf_core::units::{KELVIN_OFFSET, k_to_c};
use sf_solver::{DefocusProblem, solve_defocus};

/// Heat below this is treated as no offer (MW).
const EPSILON_OFFER_MW: f64 = 1e-9;

/// What the power cycle can do with the heat on offer, judged from design
/// limits, permissions and the committed cycle mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Acceptance {
    Accept,
    /// Above the maximum load; reduce the offer to this (MW)
    Clip(f64),
    /// Below cutoff but the cycle may hold standby at this input (MW)
    Standby(f64),
    /// The cycle cannot use the heat this step
    Reject,
}

impl Acceptance {
    pub fn estimate(
        cycle: &PcSolvedParams,
        pc_mode: PcMode,
        permissions: &Permissions,
        q_offer_mw: f64,
    ) -> Self {
        if q_offer_mw <= EPSILON_OFFER_MW {
            return Acceptance::Accept;
        }
        if pc_mode == PcMode::Off && !permissions.is_pc_su_allowed {
            return Acceptance::Reject;
        }
        if q_offer_mw > cycle.q_max_mw() {
            return Acceptance::Clip(cycle.q_max_mw());
        }
        if q_offer_mw >= cycle.q_min_mw() {
            return Acceptance::Accept;
        }
        if pc_mode.is_running() && permissions.is_pc_sb_allowed && q_offer_mw >= cycle.q_sb_mw() {
            return Acceptance::Standby(cycle.q_sb_mw());
        }
        Acceptance::Reject
    }

    /// Thermal power the receiver should be brought down to, if any.
    pub fn target_mw(self) -> Option<f64> {
        match self {
            Acceptance::Accept => None,
            Acceptance::Clip(q) | Acceptance::Standby(q) => Some(q),
            Acceptance::Reject => Some(0.0),
        }
    }
}

/// State carried by the loop from one timestep to the next.
#[derive(Clone, Copy, Debug)]
struct LoopState {
    sim: SimInfo,
    permissions: Permissions,
    t_htf_cold_c: f64,
    cr_mode: CrMode,
    pc_mode: PcMode,
}

struct Names {
    weather: String,
    receiver: String,
    cycle: String,
}

/// Plant-level controller for a CSP plant without storage.
///
/// Borrows its three components exclusively for its whole lifetime; each
/// component belongs to one solver at a time.
///
/// # Example
///
/// ```no_run
/// use sf_components::{PowerCycleConfig, RankineCycle, ReceiverConfig, SyntheticWeather, TowerReceiver};
/// use sf_sim::{CspSolver, SimOptions};
///
/// let mut weather = SyntheticWeather::default().build("weather");
/// let mut receiver = TowerReceiver::new(ReceiverConfig::default());
/// let mut cycle = RankineCycle::new(PowerCycleConfig::default());
///
/// let mut solver = CspSolver::new(&mut weather, &mut receiver, &mut cycle, SimOptions::default());
/// solver.init().unwrap();
/// let run = solver.simulate().unwrap();
/// assert_eq!(run.records.len(), 8760);
/// ```
pub struct CspSolver<'a> {
    weather: &'a mut dyn WeatherSource,
    receiver: &'a mut dyn CollectorReceiver,
    cycle: &'a mut dyn PowerCycle,
    policy: Box<dyn PermissionPolicy + 'a>,
    options: SimOptions,
    design: Option<DesignPoint>,
}

impl<'a> CspSolver<'a> {
    pub fn new(
        weather: &'a mut dyn WeatherSource,
        receiver: &'a mut dyn CollectorReceiver,
        cycle: &'a mut dyn PowerCycle,
        options: SimOptions,
    ) -> Self {
        Self {
            weather,
            receiver,
            cycle,
            policy: Box::new(AlwaysAllow),
            options,
            design: None,
        }
    }

    /// Replace the permission policy (default: [`AlwaysAllow`]).
    pub fn with_policy(mut self, policy: Box<dyn PermissionPolicy + 'a>) -> Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    /// Design values cached by [`init`](Self::init).
    pub fn design(&self) -> Option<&DesignPoint> {
        self.design.as_ref()
    }

    /// Initialise weather, receiver and power cycle, then cache and check
    /// their design values.
    pub fn init(&mut self) -> SimResult<DesignPoint> {
        self.options.validate()?;

        self.weather
            .init()
            .map_err(|e| SimError::from_init(self.weather.name(), e))?;
        self.receiver
            .init()
            .map_err(|e| SimError::from_init(self.receiver.name(), e))?;
        self.cycle
            .init()
            .map_err(|e| SimError::from_init(self.cycle.name(), e))?;

        let design = DesignPoint {
            receiver: self.receiver.design_parameters(),
            cycle: self.cycle.design_parameters(),
        };
        validate_design(&design)?;

        tracing::info!(
            receiver = self.receiver.name(),
            cycle = self.cycle.name(),
            q_rec_des_mw = design.receiver.q_rec_des_mw,
            q_pc_des_mw = design.cycle.q_dot_des_mw,
            w_dot_des_mw = design.cycle.w_dot_des_mw,
            t_htf_cold_des_c = k_to_c(design.receiver.t_htf_cold_des_k),
            policy = self.policy.name(),
            "CSP plant initialised"
        );

        self.design = Some(design);
        Ok(design)
    }

    /// Run every timestep.
    pub fn simulate(&mut self) -> Result<SimRun, SimFailure> {
        self.simulate_with_progress(|_| {})
    }

    /// Run every timestep, reporting progress after each one.
    ///
    /// A fatal error stops the run at the failing step; the returned
    /// [`SimFailure`] holds what was completed before it.
    pub fn simulate_with_progress<F>(&mut self, mut on_step: F) -> Result<SimRun, SimFailure>
    where
        F: FnMut(&SimProgress),
    {
        let design = self.design.ok_or_else(|| {
            SimFailure::new(SimError::Configuration {
                what: "simulate() called before init()".to_string(),
            })
        })?;
        let sim = SimInfo::new(self.options.step_s).map_err(|e| SimFailure::new(e.into()))?;

        let names = Names {
            weather: self.weather.name().to_string(),
            receiver: self.receiver.name().to_string(),
            cycle: self.cycle.name().to_string(),
        };

        self.policy.reset();
        let mut state = LoopState {
            sim,
            permissions: Permissions::default(),
            t_htf_cold_c: k_to_c(design.receiver.t_htf_cold_des_k),
            cr_mode: CrMode::Off,
            pc_mode: PcMode::Off,
        };

        let n_steps = self.options.n_steps;
        let mut records = Vec::with_capacity(n_steps);
        let mut diagnostics = Vec::new();

        for hour in 0..n_steps {
            match self.step(hour, &design, &names, &mut state, &mut diagnostics) {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::error!(hour, error = %error, "CSP simulation aborted");
                    return Err(SimFailure {
                        error,
                        records,
                        diagnostics,
                    });
                }
            }
            on_step(&SimProgress {
                step: hour + 1,
                n_steps,
                time_s: state.sim.time_s,
                warnings: diagnostics.len(),
            });
        }

        tracing::info!(
            steps = records.len(),
            warnings = diagnostics.len(),
            "CSP simulation complete"
        );

        Ok(SimRun {
            design,
            records,
            diagnostics,
        })
    }

    fn step(
        &mut self,
        hour: usize,
        design: &DesignPoint,
        names: &Names,
        state: &mut LoopState,
        diagnostics: &mut Vec<SimDiagnostic>,
    ) -> SimResult<TimestepRecord> {
        state.sim.set_step_index(hour);
        let sim = state.sim;

        let weather = self
            .weather
            .timestep_call(&sim)
            .map_err(|e| SimError::from_component(hour, &names.weather, e))?;
        check_weather(hour, &names.weather, &weather)?;

        let htf = HtfState {
            temp_in_c: state.t_htf_cold_c,
        };

        let fc0 = if state.cr_mode == CrMode::Off && !state.permissions.is_rec_su_allowed {
            0.0
        } else {
            1.0
        };

        let receiver = &mut *self.receiver;
        let mut eval_receiver = |fc: f64| -> SimResult<CrOutputs> {
            let out = receiver
                .call(&weather, &htf, &CrInputs { field_control: fc }, &sim)
                .map_err(|e| SimError::from_component(hour, &names.receiver, e))?;
            check_receiver(hour, &names.receiver, &out)?;
            Ok(out)
        };

        let mut cr_out = eval_receiver(fc0)?;
        let mut field_control = fc0;
        let mut iterations = 0;
        let mut converged = true;

        let acceptance = Acceptance::estimate(
            &design.cycle,
            state.pc_mode,
            &state.permissions,
            cr_out.q_thermal_mw,
        );
        // A receiver finishing startup inside this step keeps its focus
        let target = match acceptance {
            Acceptance::Reject if !state.cr_mode.is_producing() => None,
            other => other.target_mw(),
        };

        if let Some(target_mw) = target.filter(|_| fc0 > 0.0) {
            let problem = DefocusProblem {
                fc_hi: fc0,
                q_hi_mw: cr_out.q_thermal_mw,
                target_mw,
                scale_mw: design.cycle.q_dot_des_mw,
            };
            let mut latest = cr_out;
            let result = solve_defocus(&self.options.defocus, problem, |fc| {
                latest = eval_receiver(fc)?;
                Ok::<f64, SimError>(latest.q_thermal_mw)
            })?;
            cr_out = latest;
            field_control = result.field_control;
            iterations = result.iterations;
            converged = result.converged;

            tracing::debug!(
                hour,
                ?acceptance,
                field_control,
                q_rec_mw = result.q_mw,
                iterations,
                "receiver defocused"
            );

            if !converged {
                tracing::warn!(
                    hour,
                    time_s = sim.time_s,
                    mismatch_mw = result.mismatch_mw,
                    iterations,
                    field_control,
                    "defocus did not converge; accepting last iterate"
                );
                diagnostics.push(SimDiagnostic::ConvergenceWarning {
                    hour,
                    time_s: sim.time_s,
                    mismatch_mw: result.mismatch_mw,
                    iterations,
                    field_control,
                });
            }
        }

        if fc0 == 0.0 && weather.is_sun_up() {
            tracing::debug!(hour, "receiver startup blocked by permissions");
        }

        let pc_out = self
            .cycle
            .call(cr_out.q_thermal_mw, &state.permissions, &sim)
            .map_err(|e| SimError::from_component(hour, &names.cycle, e))?;
        check_cycle(hour, &names.cycle, &pc_out)?;

        self.receiver
            .converged(&sim)
            .map_err(|e| SimError::from_component(hour, &names.receiver, e))?;
        self.cycle
            .converged(&sim)
            .map_err(|e| SimError::from_component(hour, &names.cycle, e))?;

        let record = TimestepRecord {
            hour,
            time_s: sim.time_s,
            field_control,
            q_rec_mw: cr_out.q_thermal_mw,
            q_rec_startup_mw: cr_out.q_startup_mw,
            q_pc_in_mw: pc_out.q_dot_in_mw,
            q_dumped_mw: pc_out.q_dot_dumped_mw,
            w_dot_mw: pc_out.w_dot_mw,
            cr_mode: cr_out.mode,
            pc_mode: pc_out.mode,
            permissions: state.permissions,
            iterations,
            converged,
        };

        state.permissions = self.policy.next(&PolicyContext {
            sim,
            current: state.permissions,
            cr_mode_before: state.cr_mode,
            cr_mode: cr_out.mode,
            pc_mode_before: state.pc_mode,
            pc_mode: pc_out.mode,
        });
        state.cr_mode = cr_out.mode;
        state.pc_mode = pc_out.mode;
        state.t_htf_cold_c = pc_out.t_htf_cold_c;

        Ok(record)
    }
}

fn validate_design(design: &DesignPoint) -> SimResult<()> {
    let pc = &design.cycle;
    let cr = &design.receiver;
    let bad = |what: &str| {
        Err(SimError::Configuration {
            what: what.to_string(),
        })
    };

    let values = [
        pc.w_dot_des_mw,
        pc.eta_des,
        pc.q_dot_des_mw,
        pc.cycle_max_frac,
        pc.cycle_cutoff_frac,
        pc.cycle_sb_frac,
        cr.t_htf_cold_des_k,
        cr.q_rec_des_mw,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return bad("design parameters must be finite");
    }
    if pc.w_dot_des_mw <= 0.0 || pc.q_dot_des_mw <= 0.0 {
        return bad("cycle design output and thermal input must be positive");
    }
    if !(pc.eta_des > 0.0 && pc.eta_des <= 1.0) {
        return bad("cycle design efficiency must be in (0, 1]");
    }
    if !(pc.cycle_cutoff_frac >= 0.0 && pc.cycle_cutoff_frac <= pc.cycle_max_frac) {
        return bad("cycle cutoff fraction must be in [0, max fraction]");
    }
    if !(pc.cycle_sb_frac >= 0.0 && pc.cycle_sb_frac <= pc.cycle_cutoff_frac) {
        return bad("cycle standby fraction must be in [0, cutoff fraction]");
    }
    if cr.t_htf_cold_des_k <= 0.0 {
        return bad("design cold HTF temperature must be above absolute zero");
    }
    if cr.q_rec_des_mw <= 0.0 {
        return bad("receiver design output must be positive");
    }
    Ok(())
}

fn invariant(hour: usize, component: &str, what: &'static str, value: f64) -> SimError {
    SimError::PhysicalInvariant {
        hour,
        component: component.to_string(),
        what,
        value,
    }
}

fn check_power(hour: usize, component: &str, what: &'static str, value: f64) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invariant(hour, component, what, value));
    }
    Ok(())
}

fn check_temperature(hour: usize, component: &str, what: &'static str, t_c: f64) -> SimResult<()> {
    if !t_c.is_finite() || t_c + KELVIN_OFFSET <= 0.0 {
        return Err(invariant(hour, component, what, t_c));
    }
    Ok(())
}

fn check_weather(hour: usize, component: &str, w: &WeatherOutputs) -> SimResult<()> {
    check_power(hour, component, "DNI", w.dni_w_m2)?;
    check_temperature(hour, component, "dry-bulb temperature", w.tdry_c)
}

fn check_receiver(hour: usize, component: &str, out: &CrOutputs) -> SimResult<()> {
    check_power(hour, component, "receiver thermal power", out.q_thermal_mw)?;
    check_power(hour, component, "receiver startup power", out.q_startup_mw)?;
    check_temperature(hour, component, "HTF outlet temperature", out.htf_temp_out_c)
}

fn check_cycle(hour: usize, component: &str, out: &PcOutputs) -> SimResult<()> {
    check_power(hour, component, "cycle electrical output", out.w_dot_mw)?;
    check_power(hour, component, "cycle thermal input", out.q_dot_in_mw)?;
    check_power(hour, component, "cycle dumped heat", out.q_dot_dumped_mw)?;
    check_temperature(hour, component, "HTF return temperature", out.t_htf_cold_c)
}
