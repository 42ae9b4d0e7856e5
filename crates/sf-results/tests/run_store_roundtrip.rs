use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sf_components::{CrMode, CrSolvedParams, PcMode, PcSolvedParams, Permissions};
use sf_pv::{PvWattsOutputs, PvWattsParams};
use sf_results::{
    AnnualSummary, CspRunBundle, PvSummary, RunManifest, RunStore, RunType, read_bundle,
    write_bundle,
};
use sf_sim::{DesignPoint, SimRun, TimestepRecord};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn sample_run() -> SimRun {
    let design = DesignPoint {
        receiver: CrSolvedParams {
            t_htf_cold_des_k: 563.15,
            q_rec_des_mw: 360.0,
        },
        cycle: PcSolvedParams {
            w_dot_des_mw: 115.0,
            eta_des: 0.412,
            q_dot_des_mw: 279.1,
            cycle_max_frac: 1.05,
            cycle_cutoff_frac: 0.25,
            cycle_sb_frac: 0.15,
        },
    };
    let records = (0..3)
        .map(|hour| TimestepRecord {
            hour,
            time_s: (hour + 1) as f64 * 3600.0,
            field_control: 1.0,
            q_rec_mw: 200.0,
            q_rec_startup_mw: 0.0,
            q_pc_in_mw: 200.0,
            q_dumped_mw: 0.0,
            w_dot_mw: 80.0,
            cr_mode: CrMode::On,
            pc_mode: PcMode::On,
            permissions: Permissions::default(),
            iterations: 1,
            converged: true,
        })
        .collect();
    SimRun {
        design,
        records,
        diagnostics: Vec::new(),
    }
}

#[test]
fn save_list_load_roundtrip() {
    let scenario_dir = unique_temp_dir("sf_results_scenario");
    fs::create_dir_all(&scenario_dir).expect("failed to create temp scenario dir");
    let scenario_path = scenario_dir.join("scenario.yaml");
    fs::write(&scenario_path, "version: 1\nname: test\n").expect("failed to write scenario file");

    let store = RunStore::for_scenario(&scenario_path).expect("failed to create run store");
    assert!(store.root_dir().ends_with(".solarflow/runs"));

    let manifest = RunManifest {
        run_id: "run-123".to_string(),
        scenario_name: "test".to_string(),
        timestamp: "2026-02-26T00:00:00Z".to_string(),
        run_type: RunType::Csp {
            step_s: 3600.0,
            n_steps: 3,
        },
        solver_version: "0.1.0".to_string(),
    };
    let run = sample_run();
    let summary = AnnualSummary::from_run(&run, 3600.0);

    store
        .save_csp_run(&manifest, &summary, &run)
        .expect("failed to save run");
    assert!(store.has_run("run-123"));

    let runs = store.list_runs("test").expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0], manifest);
    assert!(store.list_runs("other").unwrap().is_empty());

    assert_eq!(store.load_summary("run-123").unwrap(), summary);
    assert_eq!(store.load_timeseries("run-123").unwrap(), run.records);
    let bundle = store.load_csp_run("run-123").unwrap();
    assert_eq!(bundle.design, run.design);
    assert_eq!(bundle.manifest, manifest);

    store.delete_run("run-123").unwrap();
    assert!(!store.has_run("run-123"));
    assert!(matches!(
        store.load_manifest("run-123"),
        Err(sf_results::ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn pv_run_roundtrip() {
    let store = RunStore::new(unique_temp_dir("sf_results_pv")).unwrap();
    let params = PvWattsParams::new(4.0, 0.77);
    let outputs = PvWattsOutputs {
        tcell_c: vec![31.5],
        dc_w: vec![1900.0],
        ac_w: vec![1700.0],
    };
    let summary = PvSummary::from_outputs(&params, &outputs);
    let manifest = RunManifest::new(
        "pv-1".to_string(),
        "pv",
        RunType::PvWatts {
            step_s: 3600.0,
            steps: 1,
        },
    );

    store.save_pv_run(&manifest, &summary, &outputs).unwrap();
    assert_eq!(store.load_manifest("pv-1").unwrap(), manifest);
    assert_eq!(store.load_pv_summary("pv-1").unwrap(), summary);
    assert_eq!(store.load_pv_outputs("pv-1").unwrap(), outputs);
    assert_eq!(store.load_pv_run("pv-1").unwrap().summary, summary);
}

#[test]
fn bundle_file_roundtrip() {
    let run = sample_run();
    let bundle = CspRunBundle {
        manifest: RunManifest::new(
            "csp-1".to_string(),
            "bundle",
            RunType::Csp {
                step_s: 3600.0,
                n_steps: 3,
            },
        ),
        summary: AnnualSummary::from_run(&run, 3600.0),
        design: run.design,
        records: run.records.clone(),
        diagnostics: run.diagnostics.clone(),
    };

    let path = unique_temp_dir("sf_results_bundle").join("out").join("run.json");
    write_bundle(&path, &bundle).unwrap();
    let loaded: CspRunBundle = read_bundle(&path).unwrap();
    assert_eq!(loaded, bundle);
    assert_eq!(loaded.summary.gross_energy_mwh, 240.0);
}
