//! Run orchestration: build components from a scenario, solve, and cache.

use crate::error::{CliError, CliResult};
use sf_components::{RankineCycle, TowerReceiver};
use sf_project::{CspPlantDef, PvCaseDef, Scenario};
use sf_results::{
    AnnualSummary, CspRunBundle, PvRunBundle, PvSummary, RunManifest, RunStore, RunType,
    SOLVER_VERSION, compute_run_id,
};
use sf_sim::{CspSolver, SimProgress, SimRun};
use std::path::Path;
use std::time::Instant;

pub struct Outcome<B> {
    pub bundle: B,
    pub loaded_from_cache: bool,
    pub solve_time_s: f64,
}

fn csp_section(scenario: &Scenario) -> CliResult<&CspPlantDef> {
    scenario
        .csp
        .as_ref()
        .ok_or(CliError::MissingSection { section: "csp" })
}

fn pv_section(scenario: &Scenario) -> CliResult<&PvCaseDef> {
    scenario
        .pvwatts
        .as_ref()
        .ok_or(CliError::MissingSection { section: "pvwatts" })
}

/// Build the plant and run the annual simulation.
pub fn simulate_csp<F>(plant: &CspPlantDef, on_step: F) -> CliResult<SimRun>
where
    F: FnMut(&SimProgress),
{
    let mut weather = plant.weather.build("weather");
    let mut receiver = TowerReceiver::new(plant.receiver.clone());
    let mut cycle = RankineCycle::new(plant.power_cycle.clone());
    let policy = plant.policy.build()?;

    let mut solver = CspSolver::new(&mut weather, &mut receiver, &mut cycle, plant.solver.clone())
        .with_policy(policy);
    solver.init()?;
    let run = solver.simulate_with_progress(on_step).map_err(Box::new)?;
    Ok(run)
}

pub fn ensure_csp_run<F>(
    scenario_path: &Path,
    scenario: &Scenario,
    use_cache: bool,
    on_step: F,
) -> CliResult<Outcome<CspRunBundle>>
where
    F: FnMut(&SimProgress),
{
    let plant = csp_section(scenario)?;
    let store = RunStore::for_scenario(scenario_path)?;
    let run_type = RunType::Csp {
        step_s: plant.solver.step_s,
        n_steps: plant.solver.n_steps,
    };
    let run_id = compute_run_id(scenario, &run_type, SOLVER_VERSION);

    if use_cache && store.has_run(&run_id) {
        tracing::info!(%run_id, "loading CSP run from cache");
        return Ok(Outcome {
            bundle: store.load_csp_run(&run_id)?,
            loaded_from_cache: true,
            solve_time_s: 0.0,
        });
    }

    let started = Instant::now();
    let run = simulate_csp(plant, on_step)?;
    let solve_time_s = started.elapsed().as_secs_f64();

    let manifest = RunManifest::new(run_id, &scenario.name, run_type);
    let summary = AnnualSummary::from_run(&run, plant.solver.step_s);
    store.save_csp_run(&manifest, &summary, &run)?;

    Ok(Outcome {
        bundle: CspRunBundle {
            manifest,
            summary,
            design: run.design,
            records: run.records,
            diagnostics: run.diagnostics,
        },
        loaded_from_cache: false,
        solve_time_s,
    })
}

pub fn ensure_pv_run(
    scenario_path: &Path,
    scenario: &Scenario,
    use_cache: bool,
) -> CliResult<Outcome<PvRunBundle>> {
    let case = pv_section(scenario)?;
    let store = RunStore::for_scenario(scenario_path)?;
    let run_type = RunType::PvWatts {
        step_s: case.params.step_s,
        steps: case.inputs.len(),
    };
    let run_id = compute_run_id(scenario, &run_type, SOLVER_VERSION);

    if use_cache && store.has_run(&run_id) {
        tracing::info!(%run_id, "loading PVWatts run from cache");
        return Ok(Outcome {
            bundle: store.load_pv_run(&run_id)?,
            loaded_from_cache: true,
            solve_time_s: 0.0,
        });
    }

    let started = Instant::now();
    let outputs = sf_pv::run_pvwatts(&case.params, &case.inputs)?;
    let solve_time_s = started.elapsed().as_secs_f64();

    let manifest = RunManifest::new(run_id, &scenario.name, run_type);
    let summary = PvSummary::from_outputs(&case.params, &outputs);
    store.save_pv_run(&manifest, &summary, &outputs)?;

    Ok(Outcome {
        bundle: PvRunBundle {
            manifest,
            summary,
            outputs,
        },
        loaded_from_cache: false,
        solve_time_s,
    })
}
