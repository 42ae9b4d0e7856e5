//! Pre-loaded weather series and a synthetic clear-sky year.

use crate::common::{check_finite, check_non_negative, check_temperature_c};
use crate::error::{ComponentError, ComponentResult};
use crate::records::WeatherOutputs;
use crate::traits::WeatherSource;
use serde::{Deserialize, Serialize};
use sf_core::SimInfo;
use sf_core::sim_info::HOURS_PER_YEAR;
use std::f64::consts::PI;

/// Weather source backed by an in-memory series, one record per step.
///
/// The cursor advances by at most one record per timestep. Asking again for
/// the current step returns the cached record; skipping ahead or going back
/// is an error.
#[derive(Clone, Debug)]
pub struct TimeSeriesWeather {
    name: String,
    records: Vec<WeatherOutputs>,
    cursor: Option<usize>,
}

impl TimeSeriesWeather {
    pub fn new(name: impl Into<String>, records: Vec<WeatherOutputs>) -> Self {
        Self {
            name: name.into(),
            records,
            cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WeatherOutputs] {
        &self.records
    }

    /// Index of the last record handed out.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }
}

fn check_record(rec: &WeatherOutputs) -> ComponentResult<()> {
    check_non_negative(rec.dni_w_m2, "DNI")?;
    check_non_negative(rec.ghi_w_m2, "GHI")?;
    check_non_negative(rec.dhi_w_m2, "DHI")?;
    check_temperature_c(rec.tdry_c, "dry-bulb temperature")?;
    check_non_negative(rec.wspd_m_s, "wind speed")?;
    check_finite(rec.solar_zenith_deg, "solar zenith")?;
    Ok(())
}

impl WeatherSource for TimeSeriesWeather {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> ComponentResult<()> {
        if self.records.is_empty() {
            return Err(ComponentError::InvalidArg {
                what: "weather series is empty",
            });
        }
        for rec in &self.records {
            check_record(rec)?;
        }
        self.cursor = None;
        Ok(())
    }

    fn timestep_call(&mut self, sim: &SimInfo) -> ComponentResult<WeatherOutputs> {
        let requested = sim.step_index();
        let expected = match self.cursor {
            Some(current) if current == requested => return Ok(self.records[current]),
            Some(current) => current + 1,
            None => 0,
        };
        if requested != expected {
            return Err(ComponentError::OutOfSequence {
                expected,
                requested,
            });
        }
        if requested >= self.records.len() {
            return Err(ComponentError::Exhausted {
                index: requested,
                len: self.records.len(),
            });
        }
        self.cursor = Some(requested);
        Ok(self.records[requested])
    }
}

/// Parameters of a deterministic clear-sky year.
///
/// Solar position uses Spencer's declination series and the hour angle at the
/// middle of each hour (solar time). DNI follows a Meinel-type air-mass
/// attenuation scaled so that the sun at zenith gives `peak_dni_w_m2`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticWeather {
    pub latitude_deg: f64,
    pub peak_dni_w_m2: f64,
    /// Diffuse horizontal as a fraction of DNI
    pub diffuse_frac: f64,
    pub tdry_mean_c: f64,
    /// Half amplitude of the daily temperature cycle (peak at 15:00)
    pub tdry_daily_swing_c: f64,
    /// Half amplitude of the annual temperature cycle (minimum mid-January)
    pub tdry_seasonal_swing_c: f64,
    pub wspd_m_s: f64,
    pub hours: usize,
}

impl Default for SyntheticWeather {
    fn default() -> Self {
        Self {
            latitude_deg: 34.87,
            peak_dni_w_m2: 950.0,
            diffuse_frac: 0.1,
            tdry_mean_c: 19.0,
            tdry_daily_swing_c: 7.0,
            tdry_seasonal_swing_c: 10.0,
            wspd_m_s: 3.5,
            hours: HOURS_PER_YEAR,
        }
    }
}

/// Spencer (1971) solar declination (rad) for day of year `doy` (1-based).
pub fn declination_rad(doy: f64) -> f64 {
    let gamma = 2.0 * PI * (doy - 1.0) / 365.0;
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin() - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

/// Cosine of the solar zenith angle.
pub fn cos_zenith(latitude_deg: f64, doy: f64, solar_hour: f64) -> f64 {
    let lat = latitude_deg.to_radians();
    let decl = declination_rad(doy);
    let omega = (15.0 * (solar_hour - 12.0)).to_radians();
    lat.sin() * decl.sin() + lat.cos() * decl.cos() * omega.cos()
}

impl SyntheticWeather {
    pub fn record(&self, hour: usize) -> WeatherOutputs {
        let doy = (hour / 24) as f64 + 1.0;
        let solar_hour = (hour % 24) as f64 + 0.5;
        let cz = cos_zenith(self.latitude_deg, doy, solar_hour).clamp(-1.0, 1.0);

        let tdry_c = self.tdry_mean_c
            - self.tdry_seasonal_swing_c * (2.0 * PI * (doy - 15.0) / 365.0).cos()
            + self.tdry_daily_swing_c * (2.0 * PI * (solar_hour - 9.0) / 24.0).sin();

        // Near-horizon sun gives unphysical air mass
        if cz <= 0.01 {
            let mut rec = WeatherOutputs::night(tdry_c);
            rec.wspd_m_s = self.wspd_m_s;
            rec.solar_zenith_deg = cz.acos().to_degrees();
            return rec;
        }

        let air_mass = 1.0 / cz;
        let dni = self.peak_dni_w_m2 * 0.7_f64.powf(air_mass.powf(0.678) - 1.0);
        let dhi = self.diffuse_frac * dni;
        WeatherOutputs {
            dni_w_m2: dni,
            ghi_w_m2: dni * cz + dhi,
            dhi_w_m2: dhi,
            tdry_c,
            wspd_m_s: self.wspd_m_s,
            solar_zenith_deg: cz.acos().to_degrees(),
        }
    }

    pub fn build(&self, name: impl Into<String>) -> TimeSeriesWeather {
        let records = (0..self.hours).map(|h| self.record(h)).collect();
        TimeSeriesWeather::new(name, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_at(step_index: usize) -> SimInfo {
        let mut sim = SimInfo::new(3600.0).unwrap();
        sim.set_step_index(step_index);
        sim
    }

    fn flat(n: usize) -> TimeSeriesWeather {
        let records = (0..n)
            .map(|i| WeatherOutputs {
                dni_w_m2: i as f64,
                ..WeatherOutputs::night(20.0)
            })
            .collect();
        TimeSeriesWeather::new("flat", records)
    }

    #[test]
    fn advances_one_step_at_a_time() {
        let mut w = flat(3);
        w.init().unwrap();
        assert_eq!(w.timestep_call(&sim_at(0)).unwrap().dni_w_m2, 0.0);
        assert_eq!(w.timestep_call(&sim_at(1)).unwrap().dni_w_m2, 1.0);
        assert_eq!(w.cursor(), Some(1));
    }

    #[test]
    fn repeated_call_is_idempotent() {
        let mut w = flat(3);
        w.init().unwrap();
        let a = w.timestep_call(&sim_at(0)).unwrap();
        let b = w.timestep_call(&sim_at(0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(w.cursor(), Some(0));
    }

    #[test]
    fn skipping_is_rejected() {
        let mut w = flat(5);
        w.init().unwrap();
        w.timestep_call(&sim_at(0)).unwrap();
        let err = w.timestep_call(&sim_at(2)).unwrap_err();
        assert_eq!(
            err,
            ComponentError::OutOfSequence {
                expected: 1,
                requested: 2
            }
        );
    }

    #[test]
    fn exhausted_series_fails_fast() {
        let mut w = flat(1);
        w.init().unwrap();
        w.timestep_call(&sim_at(0)).unwrap();
        let err = w.timestep_call(&sim_at(1)).unwrap_err();
        assert!(matches!(err, ComponentError::Exhausted { index: 1, len: 1 }));
    }

    #[test]
    fn init_rejects_bad_records() {
        let mut w = TimeSeriesWeather::new("bad", vec![WeatherOutputs::night(-300.0)]);
        assert!(w.init().is_err());
        let mut empty = TimeSeriesWeather::new("empty", Vec::new());
        assert!(empty.init().is_err());
    }

    #[test]
    fn synthetic_year_has_day_and_night() {
        let synth = SyntheticWeather::default();
        let w = synth.build("synthetic");
        assert_eq!(w.len(), HOURS_PER_YEAR);

        // Midnight on the summer solstice is dark, noon is bright
        let midnight = w.records()[172 * 24];
        let noon = w.records()[172 * 24 + 12];
        assert_eq!(midnight.dni_w_m2, 0.0);
        assert!(!midnight.is_sun_up());
        assert!(noon.dni_w_m2 > 800.0);
        assert!(noon.dni_w_m2 <= synth.peak_dni_w_m2);
        assert!(noon.is_sun_up());
    }

    #[test]
    fn synthetic_summer_is_warmer() {
        let synth = SyntheticWeather::default();
        let jan = synth.record(14 * 24 + 14);
        let jul = synth.record(196 * 24 + 14);
        assert!(jul.tdry_c > jan.tdry_c);
    }

    #[test]
    fn declination_extremes() {
        // Near solstices the declination approaches +/-23.45 deg
        assert!((declination_rad(172.0).to_degrees() - 23.45).abs() < 0.5);
        assert!((declination_rad(355.0).to_degrees() + 23.45).abs() < 0.5);
    }
}
