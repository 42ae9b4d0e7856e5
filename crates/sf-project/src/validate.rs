//! Scenario validation logic.

use crate::schema::{CspPlantDef, PolicyDef, PvCaseDef, Scenario, WeatherDef};
use sf_components::{
    CollectorReceiver, PowerCycle, RankineCycle, SyntheticWeather, TowerReceiver,
};
use sf_controls::StandardPolicy;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing section: {what}")]
    Missing { what: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: impl ToString) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "scenario name cannot be empty"));
    }
    if scenario.csp.is_none() && scenario.pvwatts.is_none() {
        return Err(ValidationError::Missing {
            what: "scenario needs a csp plant or a pvwatts case".to_string(),
        });
    }

    if let Some(csp) = &scenario.csp {
        validate_csp(csp)?;
    }
    if let Some(pv) = &scenario.pvwatts {
        validate_pv(pv)?;
    }
    Ok(())
}

fn validate_csp(csp: &CspPlantDef) -> Result<(), ValidationError> {
    csp.solver
        .validate()
        .map_err(|e| invalid("csp.solver", "", e))?;

    match &csp.weather {
        WeatherDef::Synthetic(synth) => {
            validate_synthetic(synth)?;
            if csp.solver.step_s != 3600.0 {
                return Err(ValidationError::Unsupported {
                    feature: "csp.weather.synthetic".to_string(),
                    reason: format!(
                        "synthetic weather is hourly but the solver step is {} s",
                        csp.solver.step_s
                    ),
                });
            }
        }
        WeatherDef::Inline { records } => {
            if records.is_empty() {
                return Err(invalid("csp.weather.records", 0, "no weather records"));
            }
        }
    }
    if csp.weather.len() < csp.solver.n_steps {
        return Err(invalid(
            "csp.solver.n_steps",
            csp.solver.n_steps,
            format!("weather covers only {} steps", csp.weather.len()),
        ));
    }

    // Component configuration is checked by the components themselves
    TowerReceiver::new(csp.receiver.clone())
        .init()
        .map_err(|e| invalid("csp.receiver", &csp.receiver.name, e))?;
    RankineCycle::new(csp.power_cycle.clone())
        .init()
        .map_err(|e| invalid("csp.power_cycle", &csp.power_cycle.name, e))?;

    if let PolicyDef::Standard(config) = &csp.policy {
        StandardPolicy::new(config.clone()).map_err(|e| invalid("csp.policy", "standard", e))?;
    }
    Ok(())
}

fn validate_synthetic(synth: &SyntheticWeather) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&synth.latitude_deg) {
        return Err(invalid(
            "csp.weather.latitude_deg",
            synth.latitude_deg,
            "must be within [-90, 90]",
        ));
    }
    if !(synth.peak_dni_w_m2.is_finite() && synth.peak_dni_w_m2 >= 0.0) {
        return Err(invalid(
            "csp.weather.peak_dni_w_m2",
            synth.peak_dni_w_m2,
            "must be non-negative",
        ));
    }
    if !(0.0..=1.0).contains(&synth.diffuse_frac) {
        return Err(invalid(
            "csp.weather.diffuse_frac",
            synth.diffuse_frac,
            "must be within [0, 1]",
        ));
    }
    if !(synth.wspd_m_s.is_finite() && synth.wspd_m_s >= 0.0) {
        return Err(invalid(
            "csp.weather.wspd_m_s",
            synth.wspd_m_s,
            "must be non-negative",
        ));
    }
    Ok(())
}

fn validate_pv(pv: &PvCaseDef) -> Result<(), ValidationError> {
    pv.params
        .validate()
        .map_err(|e| invalid(&format!("pvwatts.params.{}", e.field()), "", e))?;
    pv.inputs
        .validate()
        .map_err(|e| invalid(&format!("pvwatts.inputs.{}", e.field()), "", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PvCaseDef;
    use sf_pv::{PvWattsInputs, PvWattsParams};

    fn csp_only() -> Scenario {
        Scenario {
            version: crate::migrate::LATEST_VERSION,
            name: "plant".to_string(),
            csp: Some(CspPlantDef::default()),
            pvwatts: None,
        }
    }

    #[test]
    fn reference_plant_is_valid() {
        validate_scenario(&csp_only()).unwrap();
    }

    #[test]
    fn empty_scenario_is_rejected() {
        let scenario = Scenario {
            csp: None,
            ..csp_only()
        };
        assert!(matches!(
            validate_scenario(&scenario),
            Err(ValidationError::Missing { .. })
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let scenario = Scenario {
            version: crate::migrate::LATEST_VERSION + 1,
            ..csp_only()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(ValidationError::UnsupportedVersion {
                version: crate::migrate::LATEST_VERSION + 1
            })
        );
    }

    #[test]
    fn short_weather_is_rejected() {
        let mut scenario = csp_only();
        if let Some(csp) = scenario.csp.as_mut() {
            csp.weather = WeatherDef::Synthetic(SyntheticWeather {
                hours: 24,
                ..SyntheticWeather::default()
            });
        }
        match validate_scenario(&scenario) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "csp.solver.n_steps")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_receiver_config_names_section() {
        let mut scenario = csp_only();
        if let Some(csp) = scenario.csp.as_mut() {
            csp.receiver.aperture_m2 = -1.0;
        }
        match validate_scenario(&scenario) {
            Err(ValidationError::InvalidValue { field, .. }) => assert_eq!(field, "csp.receiver"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pv_errors_carry_the_field() {
        let scenario = Scenario {
            version: crate::migrate::LATEST_VERSION,
            name: "pv".to_string(),
            csp: None,
            pvwatts: Some(PvCaseDef {
                params: PvWattsParams::new(0.1, 0.77),
                inputs: PvWattsInputs::default(),
            }),
        };
        match validate_scenario(&scenario) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "pvwatts.params.system_size")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
