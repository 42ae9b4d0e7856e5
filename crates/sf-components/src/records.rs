//! Data records exchanged between the solver and the plant components.

use crate::modes::{CrMode, PcMode};
use serde::{Deserialize, Serialize};

/// One weather record, valid for a single timestep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherOutputs {
    /// Direct normal irradiance (W/m²)
    pub dni_w_m2: f64,
    /// Global horizontal irradiance (W/m²)
    pub ghi_w_m2: f64,
    /// Diffuse horizontal irradiance (W/m²)
    pub dhi_w_m2: f64,
    /// Dry-bulb temperature (°C)
    pub tdry_c: f64,
    /// Wind speed (m/s)
    pub wspd_m_s: f64,
    /// Solar zenith angle (deg); >= 90 means the sun is down
    pub solar_zenith_deg: f64,
}

impl WeatherOutputs {
    /// Night record at the given ambient temperature.
    pub fn night(tdry_c: f64) -> Self {
        Self {
            dni_w_m2: 0.0,
            ghi_w_m2: 0.0,
            dhi_w_m2: 0.0,
            tdry_c,
            wspd_m_s: 0.0,
            solar_zenith_deg: 180.0,
        }
    }

    pub fn is_sun_up(&self) -> bool {
        self.solar_zenith_deg < 90.0
    }
}

/// Heat-transfer-fluid state entering the collector/receiver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HtfState {
    /// Inlet temperature (°C)
    pub temp_in_c: f64,
}

/// Control inputs to the collector/receiver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrInputs {
    /// Field-control (defocus) fraction in [0, 1]; 1 = full available output
    pub field_control: f64,
}

impl Default for CrInputs {
    fn default() -> Self {
        Self { field_control: 1.0 }
    }
}

/// Collector/receiver results for one call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrOutputs {
    /// Thermal power delivered to the HTF loop (MW)
    pub q_thermal_mw: f64,
    /// Thermal power spent warming the receiver this step (MW)
    pub q_startup_mw: f64,
    /// HTF outlet temperature (°C)
    pub htf_temp_out_c: f64,
    /// Operating mode the receiver would settle in
    pub mode: CrMode,
}

/// Collector/receiver design values, fixed after `init()`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrSolvedParams {
    /// Design cold HTF temperature (K)
    pub t_htf_cold_des_k: f64,
    /// Design receiver thermal output (MW)
    pub q_rec_des_mw: f64,
}

/// Power-cycle design values, fixed after `init()`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PcSolvedParams {
    /// Design gross electrical output (MW)
    pub w_dot_des_mw: f64,
    /// Design gross efficiency (-)
    pub eta_des: f64,
    /// Design thermal input (MW)
    pub q_dot_des_mw: f64,
    /// Maximum thermal input as a fraction of design (-)
    pub cycle_max_frac: f64,
    /// Minimum thermal input for operation as a fraction of design (-)
    pub cycle_cutoff_frac: f64,
    /// Thermal input held in standby as a fraction of design (-)
    pub cycle_sb_frac: f64,
}

impl PcSolvedParams {
    pub fn q_max_mw(&self) -> f64 {
        self.cycle_max_frac * self.q_dot_des_mw
    }

    pub fn q_min_mw(&self) -> f64 {
        self.cycle_cutoff_frac * self.q_dot_des_mw
    }

    pub fn q_sb_mw(&self) -> f64 {
        self.cycle_sb_frac * self.q_dot_des_mw
    }
}

/// Solver-owned flags gating transitions into startup or standby.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub is_rec_su_allowed: bool,
    pub is_pc_su_allowed: bool,
    pub is_pc_sb_allowed: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            is_rec_su_allowed: true,
            is_pc_su_allowed: true,
            is_pc_sb_allowed: true,
        }
    }
}

/// Power-cycle results for one call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PcOutputs {
    /// Gross electrical output (MW)
    pub w_dot_mw: f64,
    /// Thermal power absorbed by the cycle, startup and standby included (MW)
    pub q_dot_in_mw: f64,
    /// Offered thermal power the cycle could not absorb (MW)
    pub q_dot_dumped_mw: f64,
    /// HTF return temperature to the receiver (°C)
    pub t_htf_cold_c: f64,
    /// Gross efficiency at this operating point (-)
    pub eta: f64,
    /// Operating mode the cycle would settle in
    pub mode: PcMode,
}
