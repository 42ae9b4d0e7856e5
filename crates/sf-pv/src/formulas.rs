//! PVWatts leaf formulas.
//!
//! Pure functions of their arguments; all irradiances in W/m², powers in W.

/// Irradiance transmitted through the module glass cover (W/m²).
///
/// Reflection losses on the beam component are applied between 50° and 90°
/// incidence with a fifth-order polynomial fit; elsewhere `poa` is returned
/// unchanged.
///
/// # Arguments
/// * `poa` - Total plane-of-array irradiance
/// * `dn` - Direct normal irradiance
/// * `inc_rad` - Incidence angle (radians)
pub fn transpoa(poa: f64, dn: f64, inc_rad: f64) -> f64 {
    const B: [f64; 6] = [1.0, -2.438e-3, 3.103e-4, -1.246e-5, 2.112e-7, -1.359e-9];

    let inc = inc_rad.to_degrees();
    if inc > 50.0 && inc < 90.0 {
        let x = B.iter().rev().fold(0.0, |acc, b| acc * inc + b);
        (poa - (1.0 - x) * dn * inc_rad.cos()).max(0.0)
    } else {
        poa
    }
}

/// DC array output (W).
///
/// Linear in irradiance above 125 W/m², quadratic in the low-light range
/// down to 0.1 W/m², zero below. Temperature correction is linear about the
/// reference temperature.
///
/// # Arguments
/// * `reftem` - Reference cell temperature (°C)
/// * `refpwr` - Rated DC power at `iref` (W)
/// * `pwrdgr` - Power change per °C (fraction, negative)
/// * `tmloss` - Losses other than the inverter (fraction)
/// * `poa` - Transmitted plane-of-array irradiance
/// * `pvt` - Cell temperature (°C)
/// * `iref` - Reference irradiance
pub fn dcpowr(
    reftem: f64,
    refpwr: f64,
    pwrdgr: f64,
    tmloss: f64,
    poa: f64,
    pvt: f64,
    iref: f64,
) -> f64 {
    let temp_factor = 1.0 + pwrdgr * (pvt - reftem);
    let dc = if poa > 125.0 {
        refpwr * temp_factor * poa / iref
    } else if poa > 0.1 {
        refpwr * temp_factor * 0.008 * poa * poa / iref
    } else {
        0.0
    };
    dc * (1.0 - tmloss)
}

/// Reference efficiency of the part-load inverter curve.
pub const INVERTER_ETA_REF: f64 = 0.9637;
const INV_A: f64 = -0.0162;
const INV_B: f64 = -0.0059;
const INV_C: f64 = 0.9858;

/// AC output of the inverter (W).
///
/// ```text
/// plr = dc / (pcrate / efffp)
/// ac  = dc * efffp / eta_ref * (A*plr + B/plr + C)
/// ```
///
/// The result is clipped to `[0, pcrate]` and never exceeds `dc`.
pub fn dctoac(pcrate: f64, efffp: f64, dc: f64) -> f64 {
    let pdc0 = pcrate / efffp;
    let plr = dc / pdc0;
    if !(plr > 0.0) {
        return 0.0;
    }
    let eta = (INV_A * plr + INV_B / plr + INV_C) * efffp / INVERTER_ETA_REF;
    (dc * eta).min(pcrate).min(dc).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpoa_unchanged_at_normal_incidence() {
        assert_eq!(transpoa(550.0, 500.0, 20f64.to_radians()), 550.0);
        assert_eq!(transpoa(550.0, 500.0, 95f64.to_radians()), 550.0);
    }

    #[test]
    fn transpoa_reduces_at_grazing_incidence() {
        let t = transpoa(550.0, 500.0, 75f64.to_radians());
        assert!(t < 550.0 && t > 0.0);
        // Larger beam share loses more
        assert!(transpoa(550.0, 800.0, 75f64.to_radians()) < t);
    }

    #[test]
    fn transpoa_never_negative() {
        assert!(transpoa(1.0, 1000.0, 89f64.to_radians()) >= 0.0);
    }

    #[test]
    fn dcpowr_branches() {
        // At reference conditions, no losses
        assert!((dcpowr(25.0, 4000.0, -0.005, 0.0, 1000.0, 25.0, 1000.0) - 4000.0).abs() < 1e-9);
        // Low light is quadratic
        let low = dcpowr(25.0, 4000.0, -0.005, 0.0, 100.0, 25.0, 1000.0);
        assert!((low - 4000.0 * 0.008 * 100.0 * 100.0 / 1000.0).abs() < 1e-9);
        assert_eq!(dcpowr(25.0, 4000.0, -0.005, 0.0, 0.05, 25.0, 1000.0), 0.0);
    }

    #[test]
    fn dcpowr_hot_cells_produce_less() {
        let cool = dcpowr(25.0, 4000.0, -0.005, 0.1, 800.0, 30.0, 1000.0);
        let hot = dcpowr(25.0, 4000.0, -0.005, 0.1, 800.0, 60.0, 1000.0);
        assert!(hot < cool);
    }

    #[test]
    fn dctoac_clips_and_bounds() {
        assert_eq!(dctoac(4000.0, 0.92, 0.0), 0.0);
        assert_eq!(dctoac(4000.0, 0.92, 10_000.0), 4000.0);
        let ac = dctoac(4000.0, 0.92, 2000.0);
        assert!(ac > 0.0 && ac < 2000.0);
        // Ideal inverter still never creates power
        assert!(dctoac(4000.0, 1.0, 2000.0) <= 2000.0);
    }
}
