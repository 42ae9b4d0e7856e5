//! sf-components: plant component library for solarflow.
//!
//! Provides:
//! - The interfaces the CSP solver drives (`WeatherSource`,
//!   `CollectorReceiver`, `PowerCycle`) and the records they exchange
//! - Per-component operating-mode state machines
//! - Reference implementations: in-memory and synthetic clear-sky weather,
//!   a lumped central receiver and a design-point Rankine cycle
//!
//! # Example
//!
//! ```no_run
//! use sf_components::{
//!     CollectorReceiver, CrInputs, HtfState, ReceiverConfig, SyntheticWeather,
//!     TowerReceiver, WeatherSource,
//! };
//! use sf_core::SimInfo;
//!
//! let mut weather = SyntheticWeather::default().build("daggett");
//! let mut receiver = TowerReceiver::new(ReceiverConfig::default());
//! weather.init().unwrap();
//! receiver.init().unwrap();
//!
//! let mut sim = SimInfo::new(3600.0).unwrap();
//! sim.set_step_index(0);
//! let wx = weather.timestep_call(&sim).unwrap();
//! let out = receiver
//!     .call(&wx, &HtfState { temp_in_c: 290.0 }, &CrInputs::default(), &sim)
//!     .unwrap();
//! println!("Receiver output: {} MW ({})", out.q_thermal_mw, out.mode);
//! ```

pub mod common;
pub mod error;
pub mod modes;
pub mod power_cycle;
pub mod receiver;
pub mod records;
pub mod traits;
pub mod weather;

// Re-exports
pub use error::{ComponentError, ComponentResult};
pub use modes::{CrMode, PcMode};
pub use power_cycle::{PowerCycleConfig, RankineCycle};
pub use receiver::{ReceiverConfig, TowerReceiver};
pub use records::{
    CrInputs, CrOutputs, CrSolvedParams, HtfState, PcOutputs, PcSolvedParams, Permissions,
    WeatherOutputs,
};
pub use traits::{CollectorReceiver, PowerCycle, WeatherSource};
pub use weather::{SyntheticWeather, TimeSeriesWeather};
