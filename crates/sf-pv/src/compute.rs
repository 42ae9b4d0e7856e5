//! PVWatts system calculation over an input series.

use crate::celltemp::{CellTempModel, DEFAULT_HEIGHT_M};
use crate::error::PvResult;
use crate::formulas::{dcpowr, dctoac, transpoa};
use crate::params::{PvSample, PvWattsInputs, PvWattsOutputs, PvWattsParams};
use sf_core::units::c_to_k;

/// Reference irradiance for rated DC power (W/m²).
const IREF: f64 = 1000.0;

/// Results for one timestep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PvPoint {
    pub tcell_c: f64,
    pub dc_w: f64,
    pub ac_w: f64,
}

/// A validated PVWatts system with its cell-temperature state.
///
/// Feed samples in time order; each call to [`step`](Self::step) advances
/// the module thermal model by one timestep.
#[derive(Clone, Debug)]
pub struct PvWattsSystem {
    watt_spec: f64,
    reftem: f64,
    pwrdgr: f64,
    tmloss: f64,
    efffp: f64,
    cell: CellTempModel,
}

impl PvWattsSystem {
    pub fn new(params: &PvWattsParams) -> PvResult<Self> {
        params.validate()?;
        let cell = CellTempModel::new(
            c_to_k(params.inoct_c),
            DEFAULT_HEIGHT_M,
            params.step_s / 3600.0,
        )?;
        Ok(Self {
            watt_spec: params.watt_spec(),
            reftem: params.t_ref_c,
            pwrdgr: params.gamma_pct_per_c / 100.0,
            tmloss: params.tmloss(),
            efffp: params.inv_eff,
            cell,
        })
    }

    /// Rated DC power (W).
    pub fn watt_spec(&self) -> f64 {
        self.watt_spec
    }

    pub fn step(&mut self, s: &PvSample) -> PvPoint {
        let poa = s.poa();
        if poa <= 0.0 {
            return PvPoint {
                tcell_c: s.tdry,
                dc_w: 0.0,
                ac_w: 0.0,
            };
        }

        // Without beam there is no cover reflection loss to apply
        let tpoa = if s.beam > 0.0 {
            transpoa(poa, s.beam, s.incidence_deg.to_radians())
        } else {
            poa
        };
        let tcell_c = self.cell.step(poa, s.wspd, s.tdry);
        let dc_w = dcpowr(
            self.reftem,
            self.watt_spec,
            self.pwrdgr,
            self.tmloss,
            tpoa,
            tcell_c,
            IREF,
        );
        let ac_w = dctoac(self.watt_spec, self.efffp, dc_w);
        PvPoint {
            tcell_c,
            dc_w,
            ac_w,
        }
    }
}

/// Compute cell temperature, DC and AC output for every input timestep.
///
/// Parameters and inputs are fully validated before anything is computed.
pub fn run_pvwatts(params: &PvWattsParams, inputs: &PvWattsInputs) -> PvResult<PvWattsOutputs> {
    inputs.validate()?;
    let mut system = PvWattsSystem::new(params)?;

    let n = inputs.len();
    let mut out = PvWattsOutputs::with_capacity(n);
    let mut night_steps = 0usize;
    for i in 0..n {
        let sample = inputs.sample(i);
        if sample.poa() <= 0.0 {
            night_steps += 1;
        }
        let point = system.step(&sample);
        out.tcell_c.push(point.tcell_c);
        out.dc_w.push(point.dc_w);
        out.ac_w.push(point.ac_w);
    }

    tracing::debug!(
        steps = n,
        night_steps,
        system_size_kw = params.system_size_kw,
        "PVWatts run complete"
    );
    Ok(out)
}
