//! Self-description of the PVWatts variables.
//!
//! Tooling reads this table to list inputs and outputs with units and
//! constraints. Runtime validation lives on [`PvWattsParams`](crate::PvWattsParams)
//! and [`PvWattsInputs`](crate::PvWattsInputs), not here.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Number,
    Array,
}

/// Whether a variable must be supplied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    Required,
    Default(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constraint {
    Positive,
    Min(f64),
    Max(f64),
    /// Same length as the named array
    LengthEqual(&'static str),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Positive => write!(f, "POSITIVE"),
            Constraint::Min(v) => write!(f, "MIN={v}"),
            Constraint::Max(v) => write!(f, "MAX={v}"),
            Constraint::LengthEqual(other) => write!(f, "LENGTH_EQUAL={other}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VarInfo {
    pub kind: VarKind,
    pub data: DataKind,
    pub name: &'static str,
    pub label: &'static str,
    pub units: &'static str,
    pub group: &'static str,
    pub requirement: Requirement,
    pub constraints: &'static [Constraint],
}

const SAME_AS_BEAM: &[Constraint] = &[Constraint::LengthEqual("beam")];
const POSITIVE: &[Constraint] = &[Constraint::Positive];
const FRACTION: &[Constraint] = &[Constraint::Min(0.0), Constraint::Max(1.0)];
const SYSTEM_SIZE: &[Constraint] = &[Constraint::Min(0.5), Constraint::Max(100_000.0)];
const NONE: &[Constraint] = &[];

const fn weather(name: &'static str, label: &'static str, units: &'static str, same_len: bool) -> VarInfo {
    VarInfo {
        kind: VarKind::Input,
        data: DataKind::Array,
        name,
        label,
        units,
        group: "Weather",
        requirement: Requirement::Required,
        constraints: if same_len { SAME_AS_BEAM } else { NONE },
    }
}

const fn param(
    name: &'static str,
    label: &'static str,
    units: &'static str,
    requirement: Requirement,
    constraints: &'static [Constraint],
) -> VarInfo {
    VarInfo {
        kind: VarKind::Input,
        data: DataKind::Number,
        name,
        label,
        units,
        group: "PVWatts",
        requirement,
        constraints,
    }
}

const fn output(name: &'static str, label: &'static str, units: &'static str) -> VarInfo {
    VarInfo {
        kind: VarKind::Output,
        data: DataKind::Array,
        name,
        label,
        units,
        group: "PVWatts",
        requirement: Requirement::Required,
        constraints: SAME_AS_BEAM,
    }
}

/// Every PVWatts input and output.
pub static PVWATTS_VARS: &[VarInfo] = &[
    weather("beam", "Direct normal radiation", "W/m2", false),
    weather("poa_beam", "Incident direct normal radiation", "W/m2", true),
    weather("poa_skydiff", "Incident sky diffuse radiation", "W/m2", true),
    weather("poa_gnddiff", "Incident ground diffuse irradiance", "W/m2", true),
    weather("tdry", "Dry bulb temperature", "C", true),
    weather("wspd", "Wind speed", "m/s", true),
    weather("incidence", "Incidence angle to surface", "deg", true),
    param(
        "step",
        "Time step of input data",
        "s",
        Requirement::Default(3600.0),
        POSITIVE,
    ),
    param(
        "system_size",
        "Nameplate capacity",
        "kW",
        Requirement::Required,
        SYSTEM_SIZE,
    ),
    param(
        "derate",
        "System derate value",
        "frac",
        Requirement::Required,
        FRACTION,
    ),
    param(
        "inoct",
        "Nominal operating cell temperature",
        "C",
        Requirement::Default(45.0),
        POSITIVE,
    ),
    param(
        "t_ref",
        "Reference cell temperature",
        "C",
        Requirement::Default(25.0),
        POSITIVE,
    ),
    param(
        "gamma",
        "Max power temperature coefficient",
        "%/C",
        Requirement::Default(-0.5),
        NONE,
    ),
    param(
        "inv_eff",
        "Inverter efficiency at rated power",
        "frac",
        Requirement::Default(0.92),
        FRACTION,
    ),
    output("tcell", "Cell temperature", "C"),
    output("dc", "DC array output", "W"),
    output("ac", "AC system output", "W"),
];

/// Look up a variable by name.
pub fn var_info(name: &str) -> Option<&'static VarInfo> {
    PVWATTS_VARS.iter().find(|v| v.name == name)
}
