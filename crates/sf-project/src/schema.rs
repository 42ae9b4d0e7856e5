//! Scenario document schema.
//!
//! A scenario holds a CSP plant, a PVWatts case, or both. Every section of
//! the CSP plant falls back to the reference configuration when omitted, so
//! `csp: {}` is a runnable plant.

use serde::{Deserialize, Serialize};
use sf_components::{
    PowerCycleConfig, ReceiverConfig, SyntheticWeather, TimeSeriesWeather, WeatherOutputs,
};
use sf_controls::{
    AlwaysAllow, ControlResult, PermissionPolicy, StandardPolicy, StandardPolicyConfig,
};
use sf_pv::{PvWattsInputs, PvWattsParams};
use sf_sim::SimOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csp: Option<CspPlantDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvwatts: Option<PvCaseDef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspPlantDef {
    pub weather: WeatherDef,
    pub receiver: ReceiverConfig,
    pub power_cycle: PowerCycleConfig,
    pub policy: PolicyDef,
    pub solver: SimOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeatherDef {
    /// Deterministic clear-sky year
    Synthetic(SyntheticWeather),
    /// Records given directly in the document, one per timestep
    Inline { records: Vec<WeatherOutputs> },
}

impl Default for WeatherDef {
    fn default() -> Self {
        WeatherDef::Synthetic(SyntheticWeather::default())
    }
}

impl WeatherDef {
    /// Number of timesteps the source can serve.
    pub fn len(&self) -> usize {
        match self {
            WeatherDef::Synthetic(s) => s.hours,
            WeatherDef::Inline { records } => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn build(&self, name: &str) -> TimeSeriesWeather {
        match self {
            WeatherDef::Synthetic(s) => s.build(name),
            WeatherDef::Inline { records } => TimeSeriesWeather::new(name, records.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyDef {
    AlwaysAllow,
    Standard(StandardPolicyConfig),
}

impl Default for PolicyDef {
    fn default() -> Self {
        PolicyDef::Standard(StandardPolicyConfig::default())
    }
}

impl PolicyDef {
    pub fn build(&self) -> ControlResult<Box<dyn PermissionPolicy>> {
        Ok(match self {
            PolicyDef::AlwaysAllow => Box::new(AlwaysAllow),
            PolicyDef::Standard(config) => Box::new(StandardPolicy::new(config.clone())?),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PvCaseDef {
    pub params: PvWattsParams,
    #[serde(default)]
    pub inputs: PvWattsInputs,
}
