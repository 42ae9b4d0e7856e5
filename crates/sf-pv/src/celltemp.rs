//! PVWatts module thermal model.
//!
//! A lumped energy balance on the module: absorbed irradiance against forced
//! and free convection plus long-wave exchange with sky and ground. The
//! module has thermal capacitance, so each step relaxes from the previous
//! module temperature; the model therefore carries state and must see the
//! timesteps in order.

use crate::error::{PvError, PvResult};
use sf_core::units::KELVIN_OFFSET;

/// Ambient temperature at NOCT conditions (K).
pub const NOCT_AMBIENT_K: f64 = 293.15;
/// Sky temperature at NOCT conditions (K).
const NOCT_SKY_K: f64 = 282.21;
/// Irradiance at NOCT conditions (W/m²).
const NOCT_IRRADIANCE: f64 = 800.0;
/// Mounting height of the wind-speed measurement (m).
const ANEMOMETER_HEIGHT_M: f64 = 9.144;

const BOLTZ: f64 = 5.669e-8;
const CAPO: f64 = 11000.0;
const ABSORB: f64 = 0.83;
const EMMIS: f64 = 0.84;
/// Characteristic module length (m)
const XLEN: f64 = 0.5;
/// Air specific heat (J/kg-K)
const CP_AIR: f64 = 1007.0;
/// Air Prandtl number
const PR_AIR: f64 = 0.71;

/// Why an installed NOCT at or below the NOCT ambient is refused.
pub const INOCT_CALIBRATION_REASON: &str =
    "must exceed the 20 °C ambient the cell temperature model is calibrated against";

/// Default array height above ground (m).
pub const DEFAULT_HEIGHT_M: f64 = 5.0;

/// Air properties at mean film temperature `tave` (K).
struct Air {
    density: f64,
    viscosity: f64,
    conductivity: f64,
}

impl Air {
    fn at(tave: f64) -> Self {
        let density = 0.003484 * 101325.0 / tave;
        Self {
            density,
            viscosity: 0.24237e-6 * tave.powf(0.76) / density,
            conductivity: 2.1695e-4 * tave.powf(0.84),
        }
    }

    fn forced_laminar(&self, wind: f64) -> f64 {
        let re = wind * XLEN / self.viscosity;
        0.8600 / re.powf(0.5) * self.density * wind * CP_AIR / PR_AIR.powf(0.67)
    }

    fn forced(&self, wind: f64) -> f64 {
        let re = wind * XLEN / self.viscosity;
        if re > 1.2e5 {
            0.0282 / re.powf(0.2) * self.density * wind * CP_AIR / PR_AIR.powf(0.4)
        } else {
            self.forced_laminar(wind)
        }
    }

    fn free(&self, tave: f64, dt: f64) -> f64 {
        let grashf = 9.8 / tave * dt.abs() * XLEN.powi(3) / self.viscosity.powi(2) * 0.5;
        0.21 * (grashf * PR_AIR).powf(0.32) * self.conductivity / XLEN
    }
}

fn radiative(emit_k: f64, other_k: f64) -> f64 {
    EMMIS * BOLTZ * (emit_k * emit_k + other_k * other_k) * (emit_k + other_k)
}

fn sky_temperature(tamb_k: f64) -> f64 {
    0.68 * (0.0552 * tamb_k.powf(1.5)) + 0.32 * tamb_k
}

/// Module temperature filter.
///
/// Calibrated at construction so the steady module temperature at NOCT
/// conditions (800 W/m², 20 °C, 1 m/s) equals the installed NOCT.
#[derive(Clone, Debug)]
pub struct CellTempModel {
    height_m: f64,
    dt_hr: f64,
    /// Ratio of total to top-side convection
    convrt: f64,
    /// Ground temperature rise as a fraction of module rise
    tgrat: f64,
    /// Module heat capacity (J/m²-K)
    cap: f64,
    /// Module temperature after the previous step (K)
    tmodo: f64,
    /// Absorbed irradiance in the previous step (W/m²)
    suno: f64,
}

impl CellTempModel {
    /// # Arguments
    /// * `inoct_k` - Installed nominal operating cell temperature (K)
    /// * `height_m` - Array height (m)
    /// * `dt_hr` - Timestep (hours)
    pub fn new(inoct_k: f64, height_m: f64, dt_hr: f64) -> PvResult<Self> {
        if !(inoct_k.is_finite() && inoct_k > NOCT_AMBIENT_K) {
            return Err(PvError::config("inoct", INOCT_CALIBRATION_REASON));
        }
        if !(height_m.is_finite() && height_m > 0.0) {
            return Err(PvError::config("height", "must be positive"));
        }
        if !(dt_hr.is_finite() && dt_hr > 0.0) {
            return Err(PvError::config("step", "must be positive"));
        }

        let rise = inoct_k - NOCT_AMBIENT_K;

        // Top-side convection at NOCT
        let tave = (inoct_k + NOCT_AMBIENT_K) / 2.0;
        let air = Air::at(tave);
        let hforce = air.forced_laminar(1.0);
        let hfree = air.free(tave, rise);
        let hconv = (hfree.powi(3) + hforce.powi(3)).powf(1.0 / 3.0);

        // Back-side share of the balance sets the ground temperature
        let hgrnd = radiative(inoct_k, NOCT_AMBIENT_K);
        let backrt = (ABSORB * NOCT_IRRADIANCE
            - EMMIS * BOLTZ * (inoct_k.powi(4) - NOCT_SKY_K.powi(4))
            - hconv * rise)
            / ((hgrnd + hconv) * rise);
        let tgrnd = (inoct_k.powi(4) - backrt * (inoct_k.powi(4) - NOCT_AMBIENT_K.powi(4)))
            .powf(0.25)
            .clamp(NOCT_AMBIENT_K, inoct_k);
        let tgrat = (tgrnd - NOCT_AMBIENT_K) / rise;
        let convrt = (ABSORB * NOCT_IRRADIANCE
            - EMMIS
                * BOLTZ
                * (2.0 * inoct_k.powi(4) - NOCT_SKY_K.powi(4) - tgrnd.powi(4)))
            / (hconv * rise);

        let cap = if inoct_k > 321.8 {
            CAPO * (1.0 + (inoct_k - 321.8) / 12.7)
        } else {
            CAPO
        };

        if !(convrt.is_finite() && tgrat.is_finite()) {
            return Err(PvError::config("inoct", "thermal calibration is not finite"));
        }

        Ok(Self {
            height_m,
            dt_hr,
            convrt,
            tgrat,
            cap,
            tmodo: NOCT_AMBIENT_K,
            suno: 0.0,
        })
    }

    /// Module temperature carried into the next step (°C).
    pub fn module_temp_c(&self) -> f64 {
        self.tmodo - KELVIN_OFFSET
    }

    /// Advance one step and return the cell temperature (°C).
    ///
    /// # Arguments
    /// * `poa` - Plane-of-array irradiance (W/m²)
    /// * `wspd` - Wind speed at anemometer height (m/s)
    /// * `tamb_c` - Ambient dry-bulb temperature (°C)
    pub fn step(&mut self, poa: f64, wspd: f64, tamb_c: f64) -> f64 {
        let suun = poa * ABSORB;
        let tamb = tamb_c + KELVIN_OFFSET;
        let tsky = sky_temperature(tamb);
        let wind = wspd * (self.height_m / ANEMOMETER_HEIGHT_M).powf(0.2) + 1e-4;

        let mut tmod = self.tmodo;
        for _ in 0..10 {
            let tave = (tmod + tamb) / 2.0;
            let air = Air::at(tave);
            let hforce = air.forced(wind);
            let hfree = air.free(tave, tmod - tamb);
            let hconv = self.convrt * (hfree.powi(3) + hforce.powi(3)).powf(1.0 / 3.0);
            let hsky = radiative(tmod, tsky);
            let tgrnd = tamb + self.tgrat * (tmod - tamb);
            let hgrnd = radiative(tmod, tgrnd);

            let h = hconv + hsky + hgrnd;
            let eigen = -h / self.cap * self.dt_hr * 3600.0;
            let ex = if eigen > -10.0 { eigen.exp() } else { 0.0 };
            tmod = self.tmodo * ex
                + ((1.0 - ex)
                    * (hconv * tamb
                        + hsky * tsky
                        + hgrnd * tgrnd
                        + self.suno
                        + (suun - self.suno) / eigen)
                    + suun
                    - self.suno)
                    / h;
        }

        self.tmodo = tmod;
        self.suno = suun;
        tmod - KELVIN_OFFSET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CellTempModel {
        CellTempModel::new(45.0 + KELVIN_OFFSET, DEFAULT_HEIGHT_M, 1.0).unwrap()
    }

    #[test]
    fn noct_conditions_reproduce_noct() {
        // Wind of 1 m/s at array height
        let wspd = (1.0 - 1e-4) / (DEFAULT_HEIGHT_M / ANEMOMETER_HEIGHT_M).powf(0.2);
        let mut m = model();
        let mut t = 0.0;
        for _ in 0..5 {
            t = m.step(800.0, wspd, 20.0);
        }
        assert!((t - 45.0).abs() < 3.0, "steady NOCT temperature {t}");
    }

    #[test]
    fn sun_heats_module_above_ambient() {
        let mut m = model();
        let t = m.step(550.0, 2.0, 25.0);
        assert!(t > 25.0);
        assert!(t < 80.0);
    }

    #[test]
    fn more_wind_cools_module() {
        let mut calm = model();
        let mut windy = model();
        let t_calm = calm.step(900.0, 0.5, 25.0);
        let t_windy = windy.step(900.0, 10.0, 25.0);
        assert!(t_windy < t_calm);
    }

    #[test]
    fn carries_state_between_steps() {
        // Short steps keep memory of the previous module temperature
        let mut warm = CellTempModel::new(45.0 + KELVIN_OFFSET, 5.0, 0.01).unwrap();
        for _ in 0..200 {
            warm.step(1000.0, 1.0, 30.0);
        }
        let mut cold = CellTempModel::new(45.0 + KELVIN_OFFSET, 5.0, 0.01).unwrap();
        assert!(warm.module_temp_c() > cold.module_temp_c());
        assert!(warm.step(200.0, 1.0, 20.0) > cold.step(200.0, 1.0, 20.0));
    }

    #[test]
    fn rejects_inoct_below_reference_ambient() {
        assert!(CellTempModel::new(290.0, 5.0, 1.0).is_err());
        assert!(CellTempModel::new(318.15, 0.0, 1.0).is_err());
        assert!(CellTempModel::new(318.15, 5.0, 0.0).is_err());
    }
}
