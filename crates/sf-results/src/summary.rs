//! Aggregate statistics over a finished run.

use serde::{Deserialize, Serialize};
use sf_components::{CrMode, PcMode};
use sf_pv::{PvWattsOutputs, PvWattsParams};
use sf_sim::SimRun;

/// Hours spent in each receiver mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CrModeHours {
    pub off: f64,
    pub startup: f64,
    pub on: f64,
    pub defocus: f64,
}

impl CrModeHours {
    fn add(&mut self, mode: CrMode, hours: f64) {
        match mode {
            CrMode::Off => self.off += hours,
            CrMode::Startup => self.startup += hours,
            CrMode::On => self.on += hours,
            CrMode::Defocus => self.defocus += hours,
        }
    }

    pub fn total(&self) -> f64 {
        self.off + self.startup + self.on + self.defocus
    }
}

/// Hours spent in each power-cycle mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PcModeHours {
    pub off: f64,
    pub startup: f64,
    pub on: f64,
    pub standby: f64,
}

impl PcModeHours {
    fn add(&mut self, mode: PcMode, hours: f64) {
        match mode {
            PcMode::Off => self.off += hours,
            PcMode::Startup => self.startup += hours,
            PcMode::On => self.on += hours,
            PcMode::Standby => self.standby += hours,
        }
    }

    pub fn total(&self) -> f64 {
        self.off + self.startup + self.on + self.standby
    }
}

/// Annual totals of a CSP run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub n_steps: usize,
    pub step_s: f64,
    /// Gross electrical energy (MWh)
    pub gross_energy_mwh: f64,
    /// Receiver thermal energy delivered to the HTF (MWh)
    pub thermal_energy_mwh: f64,
    /// Thermal energy used by the cycle (MWh)
    pub cycle_input_mwh: f64,
    /// Thermal energy the cycle could not absorb (MWh)
    pub dumped_energy_mwh: f64,
    /// Receiver heat spent on startup (MWh)
    pub startup_energy_mwh: f64,
    /// Gross energy over design output for the simulated period (-)
    pub capacity_factor: f64,
    pub receiver_hours: CrModeHours,
    pub cycle_hours: PcModeHours,
    /// Steps run below full field focus
    pub defocused_steps: usize,
    pub convergence_warnings: usize,
}

impl AnnualSummary {
    pub fn from_run(run: &SimRun, step_s: f64) -> Self {
        let step_hr = step_s / 3600.0;
        let mut summary = Self {
            n_steps: run.records.len(),
            step_s,
            gross_energy_mwh: 0.0,
            thermal_energy_mwh: 0.0,
            cycle_input_mwh: 0.0,
            dumped_energy_mwh: 0.0,
            startup_energy_mwh: 0.0,
            capacity_factor: 0.0,
            receiver_hours: CrModeHours::default(),
            cycle_hours: PcModeHours::default(),
            defocused_steps: 0,
            convergence_warnings: run.convergence_warnings(),
        };

        for rec in &run.records {
            summary.gross_energy_mwh += rec.w_dot_mw * step_hr;
            summary.thermal_energy_mwh += rec.q_rec_mw * step_hr;
            summary.cycle_input_mwh += rec.q_pc_in_mw * step_hr;
            summary.dumped_energy_mwh += rec.q_dumped_mw * step_hr;
            summary.startup_energy_mwh += rec.q_rec_startup_mw * step_hr;
            summary.receiver_hours.add(rec.cr_mode, step_hr);
            summary.cycle_hours.add(rec.pc_mode, step_hr);
            if rec.field_control < 1.0 {
                summary.defocused_steps += 1;
            }
        }

        let design_mwh = run.design.cycle.w_dot_des_mw * summary.n_steps as f64 * step_hr;
        if design_mwh > 0.0 {
            summary.capacity_factor = summary.gross_energy_mwh / design_mwh;
        }
        summary
    }
}

/// Totals of a PVWatts run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvSummary {
    pub steps: usize,
    /// DC energy (kWh)
    pub dc_energy_kwh: f64,
    /// AC energy (kWh)
    pub ac_energy_kwh: f64,
    /// Peak AC output (W)
    pub peak_ac_w: f64,
    /// Hottest cell temperature (°C), `None` for an empty run
    pub max_tcell_c: Option<f64>,
    /// AC energy over nameplate for the simulated period (-)
    pub capacity_factor: f64,
}

impl PvSummary {
    pub fn from_outputs(params: &PvWattsParams, outputs: &PvWattsOutputs) -> Self {
        let step_hr = params.step_s / 3600.0;
        let dc_energy_kwh = outputs.dc_w.iter().sum::<f64>() * step_hr / 1000.0;
        let ac_energy_kwh = outputs.ac_w.iter().sum::<f64>() * step_hr / 1000.0;
        let nameplate_kwh = params.system_size_kw * outputs.len() as f64 * step_hr;
        Self {
            steps: outputs.len(),
            dc_energy_kwh,
            ac_energy_kwh,
            peak_ac_w: outputs.ac_w.iter().copied().fold(0.0, f64::max),
            max_tcell_c: outputs.tcell_c.iter().copied().reduce(f64::max),
            capacity_factor: if nameplate_kwh > 0.0 {
                ac_energy_kwh / nameplate_kwh
            } else {
                0.0
            },
        }
    }
}
