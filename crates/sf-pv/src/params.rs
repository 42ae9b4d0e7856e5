//! Plant parameters and input/output series.

use crate::error::{PvError, PvResult};
use serde::{Deserialize, Serialize};
use sf_core::units::KELVIN_OFFSET;

pub const MIN_SYSTEM_SIZE_KW: f64 = 0.5;
pub const MAX_SYSTEM_SIZE_KW: f64 = 100_000.0;

fn default_step_s() -> f64 {
    3600.0
}

fn default_inoct_c() -> f64 {
    45.0
}

fn default_t_ref_c() -> f64 {
    25.0
}

fn default_gamma() -> f64 {
    -0.5
}

fn default_inv_eff() -> f64 {
    0.92
}

/// Scalar parameters of a PVWatts system.
///
/// `system_size_kw` and `derate` have no default and must be given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PvWattsParams {
    /// Time step of the input data (s)
    #[serde(default = "default_step_s")]
    pub step_s: f64,
    /// Nameplate DC capacity (kW)
    pub system_size_kw: f64,
    /// System derate, inverter included (-)
    pub derate: f64,
    /// Installed nominal operating cell temperature (°C)
    #[serde(default = "default_inoct_c")]
    pub inoct_c: f64,
    /// Reference cell temperature (°C)
    #[serde(default = "default_t_ref_c")]
    pub t_ref_c: f64,
    /// Maximum-power temperature coefficient (%/°C)
    #[serde(default = "default_gamma")]
    pub gamma_pct_per_c: f64,
    /// Inverter efficiency at rated power (-)
    #[serde(default = "default_inv_eff")]
    pub inv_eff: f64,
}

impl PvWattsParams {
    /// Parameters with defaults for everything but the two required values.
    pub fn new(system_size_kw: f64, derate: f64) -> Self {
        Self {
            step_s: default_step_s(),
            system_size_kw,
            derate,
            inoct_c: default_inoct_c(),
            t_ref_c: default_t_ref_c(),
            gamma_pct_per_c: default_gamma(),
            inv_eff: default_inv_eff(),
        }
    }

    pub fn validate(&self) -> PvResult<()> {
        let fields = [
            ("step", self.step_s),
            ("system_size", self.system_size_kw),
            ("derate", self.derate),
            ("inoct", self.inoct_c),
            ("t_ref", self.t_ref_c),
            ("gamma", self.gamma_pct_per_c),
            ("inv_eff", self.inv_eff),
        ];
        for (field, v) in fields {
            if !v.is_finite() {
                return Err(PvError::config(field, format!("must be finite, got {v}")));
            }
        }

        positive("step", self.step_s)?;
        in_range(
            "system_size",
            self.system_size_kw,
            MIN_SYSTEM_SIZE_KW,
            MAX_SYSTEM_SIZE_KW,
        )?;
        in_range("derate", self.derate, 0.0, 1.0)?;
        positive("inoct", self.inoct_c)?;
        positive("t_ref", self.t_ref_c)?;
        in_range("inv_eff", self.inv_eff, 0.0, 1.0)?;
        // The inverter curve divides by the rated efficiency
        if self.inv_eff == 0.0 {
            return Err(PvError::config("inv_eff", "must be greater than 0"));
        }
        // Tighter than the declared `POSITIVE` constraint
        if self.inoct_c + KELVIN_OFFSET <= crate::celltemp::NOCT_AMBIENT_K {
            return Err(PvError::config("inoct", crate::celltemp::INOCT_CALIBRATION_REASON));
        }
        Ok(())
    }

    /// Rated DC power (W).
    pub fn watt_spec(&self) -> f64 {
        1000.0 * self.system_size_kw
    }

    /// Losses other than the inverter (-).
    pub fn tmloss(&self) -> f64 {
        1.0 - self.derate / self.inv_eff
    }
}

fn positive(field: &'static str, v: f64) -> PvResult<()> {
    sf_core::ensure_positive(v, field)
        .map(|_| ())
        .map_err(|_| PvError::config(field, format!("must be positive, got {v}")))
}

fn in_range(field: &'static str, v: f64, min: f64, max: f64) -> PvResult<()> {
    sf_core::ensure_in_range(v, min, max, field)
        .map(|_| ())
        .map_err(|_| PvError::config(field, format!("{v} outside [{min}, {max}]")))
}

/// Equal-length weather series for one PVWatts run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PvWattsInputs {
    /// Direct normal irradiance (W/m²)
    pub beam: Vec<f64>,
    /// Plane-of-array beam irradiance (W/m²)
    pub poa_beam: Vec<f64>,
    /// Plane-of-array sky diffuse irradiance (W/m²)
    pub poa_skydiff: Vec<f64>,
    /// Plane-of-array ground-reflected irradiance (W/m²)
    pub poa_gnddiff: Vec<f64>,
    /// Dry-bulb temperature (°C)
    pub tdry: Vec<f64>,
    /// Wind speed (m/s)
    pub wspd: Vec<f64>,
    /// Incidence angle on the array (deg)
    pub incidence: Vec<f64>,
}

/// One timestep of [`PvWattsInputs`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PvSample {
    pub beam: f64,
    pub poa_beam: f64,
    pub poa_skydiff: f64,
    pub poa_gnddiff: f64,
    pub tdry: f64,
    pub wspd: f64,
    pub incidence_deg: f64,
}

impl PvSample {
    /// Total plane-of-array irradiance (W/m²).
    pub fn poa(&self) -> f64 {
        self.poa_beam + self.poa_skydiff + self.poa_gnddiff
    }
}

impl PvWattsInputs {
    pub fn len(&self) -> usize {
        self.beam.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beam.is_empty()
    }

    fn series(&self) -> [(&'static str, &[f64]); 7] {
        [
            ("beam", self.beam.as_slice()),
            ("poa_beam", self.poa_beam.as_slice()),
            ("poa_skydiff", self.poa_skydiff.as_slice()),
            ("poa_gnddiff", self.poa_gnddiff.as_slice()),
            ("tdry", self.tdry.as_slice()),
            ("wspd", self.wspd.as_slice()),
            ("incidence", self.incidence.as_slice()),
        ]
    }

    /// Check lengths against `beam` and the physical sanity of each value.
    pub fn validate(&self) -> PvResult<()> {
        let n = self.len();
        for (field, values) in self.series() {
            if values.len() != n {
                return Err(PvError::config(
                    field,
                    format!("length {} does not match beam length {n}", values.len()),
                ));
            }
            if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(PvError::config(field, format!("non-finite value {v} at index {i}")));
            }
        }
        if let Some((i, v)) = self.wspd.iter().enumerate().find(|(_, v)| **v < 0.0) {
            return Err(PvError::config("wspd", format!("negative wind speed {v} at index {i}")));
        }
        if let Some((i, v)) = self
            .tdry
            .iter()
            .enumerate()
            .find(|(_, v)| **v + KELVIN_OFFSET <= 0.0)
        {
            return Err(PvError::config(
                "tdry",
                format!("temperature {v} below absolute zero at index {i}"),
            ));
        }
        Ok(())
    }

    /// Sample at index `i`. Panics if out of bounds; call after `validate`.
    pub fn sample(&self, i: usize) -> PvSample {
        PvSample {
            beam: self.beam[i],
            poa_beam: self.poa_beam[i],
            poa_skydiff: self.poa_skydiff[i],
            poa_gnddiff: self.poa_gnddiff[i],
            tdry: self.tdry[i],
            wspd: self.wspd[i],
            incidence_deg: self.incidence[i],
        }
    }
}

/// Per-timestep PVWatts results, same length as the inputs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PvWattsOutputs {
    /// Cell temperature (°C)
    pub tcell_c: Vec<f64>,
    /// DC array output over the step (W)
    pub dc_w: Vec<f64>,
    /// AC system output over the step (W)
    pub ac_w: Vec<f64>,
}

impl PvWattsOutputs {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            tcell_c: Vec::with_capacity(n),
            dc_w: Vec::with_capacity(n),
            ac_w: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.tcell_c.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tcell_c.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(n: usize) -> PvWattsInputs {
        PvWattsInputs {
            beam: vec![500.0; n],
            poa_beam: vec![400.0; n],
            poa_skydiff: vec![100.0; n],
            poa_gnddiff: vec![50.0; n],
            tdry: vec![25.0; n],
            wspd: vec![2.0; n],
            incidence: vec![20.0; n],
        }
    }

    #[test]
    fn defaults() {
        let p = PvWattsParams::new(4.0, 0.77);
        assert_eq!(p.step_s, 3600.0);
        assert_eq!(p.inoct_c, 45.0);
        assert_eq!(p.t_ref_c, 25.0);
        assert_eq!(p.gamma_pct_per_c, -0.5);
        assert_eq!(p.inv_eff, 0.92);
        p.validate().unwrap();
        assert_eq!(p.watt_spec(), 4000.0);
    }

    #[test]
    fn rejects_small_system() {
        let err = PvWattsParams::new(0.1, 0.77).validate().unwrap_err();
        assert_eq!(err.field(), "system_size");
    }

    #[test]
    fn rejects_derate_above_one() {
        let err = PvWattsParams::new(4.0, 1.5).validate().unwrap_err();
        assert_eq!(err.field(), "derate");
    }

    #[test]
    fn rejects_zero_inverter_efficiency() {
        let p = PvWattsParams {
            inv_eff: 0.0,
            ..PvWattsParams::new(4.0, 0.77)
        };
        assert_eq!(p.validate().unwrap_err().field(), "inv_eff");
    }

    #[test]
    fn rejects_cold_inoct() {
        let p = PvWattsParams {
            inoct_c: 15.0,
            ..PvWattsParams::new(4.0, 0.77)
        };
        let err = p.validate().unwrap_err();
        assert_eq!(err.field(), "inoct");
        assert!(err.to_string().contains("cell temperature model"), "{err}");
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut i = inputs(3);
        i.tdry.pop();
        let err = i.validate().unwrap_err();
        assert_eq!(err.field(), "tdry");
    }

    #[test]
    fn rejects_nan_and_negative_wind() {
        let mut i = inputs(2);
        i.incidence[1] = f64::NAN;
        assert_eq!(i.validate().unwrap_err().field(), "incidence");

        let mut i = inputs(2);
        i.wspd[0] = -1.0;
        assert_eq!(i.validate().unwrap_err().field(), "wspd");
    }

    #[test]
    fn yaml_requires_size_and_derate() {
        let p: PvWattsParams = serde_yaml::from_str("system_size_kw: 4\nderate: 0.77\n").unwrap();
        assert_eq!(p, PvWattsParams::new(4.0, 0.77));
        assert!(serde_yaml::from_str::<PvWattsParams>("derate: 0.77\n").is_err());
    }
}
