//! PVWatts photovoltaic performance from plane-of-array irradiance.
//!
//! Given equal-length series of beam and plane-of-array irradiance, ambient
//! temperature, wind speed and incidence angle, [`run_pvwatts`] returns cell
//! temperature, DC output and AC output per timestep.
//!
//! Night steps (no plane-of-array irradiance) report ambient temperature and
//! zero output without advancing the module thermal model. Day steps pass
//! through the glass-cover loss, the stateful [`CellTempModel`], the DC power
//! model and the part-load inverter curve.
//!
//! # Example
//!
//! ```
//! use sf_pv::{PvWattsInputs, PvWattsParams, run_pvwatts};
//!
//! let params = PvWattsParams::new(4.0, 0.9);
//! let inputs = PvWattsInputs {
//!     beam: vec![500.0],
//!     poa_beam: vec![400.0],
//!     poa_skydiff: vec![100.0],
//!     poa_gnddiff: vec![50.0],
//!     tdry: vec![25.0],
//!     wspd: vec![2.0],
//!     incidence: vec![20.0],
//! };
//! let out = run_pvwatts(&params, &inputs).unwrap();
//! assert!(out.ac_w[0] > 0.0 && out.ac_w[0] < out.dc_w[0]);
//! ```

pub mod celltemp;
pub mod compute;
pub mod error;
pub mod formulas;
pub mod metadata;
pub mod params;

pub use celltemp::CellTempModel;
pub use compute::{PvPoint, PvWattsSystem, run_pvwatts};
pub use error::{PvError, PvResult};
pub use metadata::{PVWATTS_VARS, VarInfo, var_info};
pub use params::{PvSample, PvWattsInputs, PvWattsOutputs, PvWattsParams};
