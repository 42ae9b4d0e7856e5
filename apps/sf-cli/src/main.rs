mod error;
mod run;

use clap::{Parser, Subcommand};
use error::CliResult;
use sf_project::Scenario;
use sf_pv::{PVWATTS_VARS, VarInfo};
use sf_results::{AnnualSummary, PvSummary, RunStore, write_bundle};
use sf_sim::SimProgress;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "SolarFlow CLI - CSP tower and PVWatts performance simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Run the annual CSP tower simulation
    RunCsp {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Write the full run bundle as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Run the PVWatts case of a scenario
    Pvwatts {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Write the full run bundle as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List the PVWatts inputs and outputs
    DescribePv {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::RunCsp {
            scenario_path,
            output,
            no_cache,
        } => cmd_run_csp(&scenario_path, output.as_deref(), !no_cache),
        Commands::Pvwatts {
            scenario_path,
            output,
            no_cache,
        } => cmd_pvwatts(&scenario_path, output.as_deref(), !no_cache),
        Commands::DescribePv { json } => cmd_describe_pv(json),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
    }
}

fn load_scenario(scenario_path: &Path) -> CliResult<Scenario> {
    Ok(sf_project::load(scenario_path)?)
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_scenario(scenario_path)?;
    println!("✓ Scenario is valid: {}", scenario.name);
    if let Some(csp) = &scenario.csp {
        println!(
            "  CSP plant: {} MWt receiver, {} MWe cycle, {} steps",
            csp.receiver.q_rec_des_mw, csp.power_cycle.w_dot_des_mw, csp.solver.n_steps
        );
    }
    if let Some(pv) = &scenario.pvwatts {
        println!(
            "  PVWatts case: {} kW, derate {}, {} steps",
            pv.params.system_size_kw,
            pv.params.derate,
            pv.inputs.len()
        );
    }
    Ok(())
}

fn cmd_run_csp(scenario_path: &Path, output: Option<&Path>, use_cache: bool) -> CliResult<()> {
    let scenario = load_scenario(scenario_path)?;
    println!("Running CSP simulation for scenario: {}", scenario.name);

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let outcome = run::ensure_csp_run(scenario_path, &scenario, use_cache, |progress| {
        let fraction = progress.fraction_complete();
        let emit_now = (fraction - last_fraction).abs() >= 0.005
            || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(progress);
            last_fraction = fraction;
            last_emit = Instant::now();
        }
    })?;
    clear_progress_line();

    let bundle = &outcome.bundle;
    if outcome.loaded_from_cache {
        println!("✓ Loaded from cache: {}", bundle.manifest.run_id);
    } else {
        println!("✓ Simulation completed: {}", bundle.manifest.run_id);
        println!("  Solve: {:.3}s", outcome.solve_time_s);
    }
    print_annual_summary(&bundle.summary);

    if let Some(path) = output {
        write_bundle(path, bundle)?;
        println!("✓ Wrote {} records to {}", bundle.records.len(), path.display());
    }
    Ok(())
}

fn cmd_pvwatts(scenario_path: &Path, output: Option<&Path>, use_cache: bool) -> CliResult<()> {
    let scenario = load_scenario(scenario_path)?;
    println!("Running PVWatts for scenario: {}", scenario.name);

    let outcome = run::ensure_pv_run(scenario_path, &scenario, use_cache)?;
    let bundle = &outcome.bundle;
    if outcome.loaded_from_cache {
        println!("✓ Loaded from cache: {}", bundle.manifest.run_id);
    } else {
        println!("✓ PVWatts completed: {}", bundle.manifest.run_id);
    }
    print_pv_summary(&bundle.summary);

    if let Some(path) = output {
        write_bundle(path, bundle)?;
        println!("✓ Wrote {} steps to {}", bundle.outputs.len(), path.display());
    }
    Ok(())
}

fn cmd_describe_pv(json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(PVWATTS_VARS)?);
        return Ok(());
    }

    println!(
        "{:<7} {:<12} {:<6} {:<38} {:<12}",
        "kind", "name", "units", "label", "constraints"
    );
    for var in PVWATTS_VARS {
        println!(
            "{:<7} {:<12} {:<6} {:<38} {:<12}",
            format!("{:?}", var.kind).to_ascii_lowercase(),
            var.name,
            var.units,
            var.label,
            describe_constraints(var)
        );
    }
    Ok(())
}

fn describe_constraints(var: &VarInfo) -> String {
    let mut parts: Vec<String> = var.constraints.iter().map(|c| c.to_string()).collect();
    if let sf_pv::metadata::Requirement::Default(v) = var.requirement {
        parts.push(format!("DEFAULT={v}"));
    }
    parts.join(",")
}

fn cmd_runs(scenario_path: &Path) -> CliResult<()> {
    let scenario = load_scenario(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;
    let runs = store.list_runs(&scenario.name)?;

    if runs.is_empty() {
        println!("No cached runs found for scenario: {}", scenario.name);
    } else {
        println!("Cached runs for scenario '{}':", scenario.name);
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.timestamp);
        }
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(progress: &SimProgress) {
    let width = 28usize;
    let fraction = progress.fraction_complete();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:>6.2}%  hour={}/{}  warnings={}",
        bar,
        fraction * 100.0,
        progress.step,
        progress.n_steps,
        progress.warnings
    );
    let _ = io::stdout().flush();
}

fn print_annual_summary(summary: &AnnualSummary) {
    println!("\nAnnual summary:");
    println!("  Gross energy:    {:.1} MWh", summary.gross_energy_mwh);
    println!("  Receiver energy: {:.1} MWh", summary.thermal_energy_mwh);
    println!("  Cycle input:     {:.1} MWh", summary.cycle_input_mwh);
    println!("  Dumped:          {:.1} MWh", summary.dumped_energy_mwh);
    println!("  Capacity factor: {:.1}%", summary.capacity_factor * 100.0);
    let rec = &summary.receiver_hours;
    println!(
        "  Receiver hours:  on {:.0}, defocus {:.0}, startup {:.0}, off {:.0}",
        rec.on, rec.defocus, rec.startup, rec.off
    );
    let pc = &summary.cycle_hours;
    println!(
        "  Cycle hours:     on {:.0}, standby {:.0}, startup {:.0}, off {:.0}",
        pc.on, pc.standby, pc.startup, pc.off
    );
    println!("  Convergence warnings: {}", summary.convergence_warnings);
}

fn print_pv_summary(summary: &PvSummary) {
    println!("\nPVWatts summary:");
    println!("  Steps:           {}", summary.steps);
    println!("  DC energy:       {:.3} kWh", summary.dc_energy_kwh);
    println!("  AC energy:       {:.3} kWh", summary.ac_energy_kwh);
    println!("  Peak AC:         {:.1} W", summary.peak_ac_w);
    if let Some(t) = summary.max_tcell_c {
        println!("  Max cell temp:   {:.1} C", t);
    }
    println!("  Capacity factor: {:.1}%", summary.capacity_factor * 100.0);
}
