//! Core traits for plant component models.
//!
//! The solver drives every component through these interfaces only. Stateful
//! components separate evaluation from commitment: `call` may run several
//! times in one timestep while the solver converges, and must not advance the
//! component's carried state; `converged` commits the state of the last call.

use crate::error::ComponentResult;
use crate::records::{
    CrInputs, CrOutputs, CrSolvedParams, HtfState, PcOutputs, PcSolvedParams, Permissions,
    WeatherOutputs,
};
use sf_core::SimInfo;

/// Supplies one weather record per timestep.
pub trait WeatherSource {
    /// Component name for diagnostics.
    fn name(&self) -> &str;

    /// Prepare the source; called once before the first timestep.
    fn init(&mut self) -> ComponentResult<()>;

    /// Weather for the step ending at `sim.time_s`.
    ///
    /// Repeated calls for the same step return the same record. Requests that
    /// skip or rewind steps fail.
    fn timestep_call(&mut self, sim: &SimInfo) -> ComponentResult<WeatherOutputs>;
}

/// Solar field plus receiver: converts irradiance into HTF thermal power.
pub trait CollectorReceiver {
    /// Component name for diagnostics.
    fn name(&self) -> &str;

    /// Size the component; called once before the first timestep.
    fn init(&mut self) -> ComponentResult<()>;

    /// Design values solved by `init`.
    fn design_parameters(&self) -> CrSolvedParams;

    /// Evaluate the step without committing state.
    fn call(
        &mut self,
        weather: &WeatherOutputs,
        htf_in: &HtfState,
        inputs: &CrInputs,
        sim: &SimInfo,
    ) -> ComponentResult<CrOutputs>;

    /// Commit the state produced by the most recent `call`.
    fn converged(&mut self, sim: &SimInfo) -> ComponentResult<()>;
}

/// Converts thermal input into electrical output.
pub trait PowerCycle {
    /// Component name for diagnostics.
    fn name(&self) -> &str;

    /// Size the component; called once before the first timestep.
    fn init(&mut self) -> ComponentResult<()>;

    /// Design values solved by `init`.
    fn design_parameters(&self) -> PcSolvedParams;

    /// Evaluate the step without committing state.
    ///
    /// # Arguments
    /// * `q_thermal_mw` - Thermal power offered by the receiver (MW)
    /// * `permissions` - Startup/standby gates for this step
    /// * `sim` - Simulation clock
    fn call(
        &mut self,
        q_thermal_mw: f64,
        permissions: &Permissions,
        sim: &SimInfo,
    ) -> ComponentResult<PcOutputs>;

    /// Commit the state produced by the most recent `call`.
    fn converged(&mut self, sim: &SimInfo) -> ComponentResult<()>;
}
