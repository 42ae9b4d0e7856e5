//! Run storage API.
//!
//! Each run gets a directory named by its run id holding `manifest.json`,
//! `summary.json` and the per-step series. CSP records go to
//! `timeseries.jsonl`, one record per line.

use crate::summary::{AnnualSummary, PvSummary};
use crate::types::{CspRunBundle, PvRunBundle, RunManifest};
use crate::{ResultsError, ResultsResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sf_pv::PvWattsOutputs;
use sf_sim::{SimRun, TimestepRecord};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a scenario file, under `.solarflow/runs`.
    pub fn for_scenario(scenario_path: &Path) -> ResultsResult<Self> {
        let scenario_dir = scenario_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "scenario path has no parent directory".to_string(),
            })?;
        Self::new(scenario_dir.join(".solarflow").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    fn create_run_dir(&self, manifest: &RunManifest) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;
        write_bundle(&run_dir.join("manifest.json"), manifest)?;
        Ok(run_dir)
    }

    pub fn save_csp_run(
        &self,
        manifest: &RunManifest,
        summary: &AnnualSummary,
        run: &SimRun,
    ) -> ResultsResult<()> {
        let run_dir = self.create_run_dir(manifest)?;
        write_bundle(&run_dir.join("summary.json"), summary)?;
        write_bundle(&run_dir.join("design.json"), &run.design)?;
        write_bundle(&run_dir.join("diagnostics.json"), &run.diagnostics)?;

        let mut timeseries_content = String::new();
        for record in &run.records {
            let line = serde_json::to_string(record)?;
            timeseries_content.push_str(&line);
            timeseries_content.push('\n');
        }
        fs::write(run_dir.join("timeseries.jsonl"), timeseries_content)?;

        tracing::debug!(run_id = %manifest.run_id, records = run.records.len(), "saved CSP run");
        Ok(())
    }

    pub fn save_pv_run(
        &self,
        manifest: &RunManifest,
        summary: &PvSummary,
        outputs: &PvWattsOutputs,
    ) -> ResultsResult<()> {
        let run_dir = self.create_run_dir(manifest)?;
        write_bundle(&run_dir.join("summary.json"), summary)?;
        write_bundle(&run_dir.join("outputs.json"), outputs)?;
        tracing::debug!(run_id = %manifest.run_id, steps = outputs.len(), "saved PVWatts run");
        Ok(())
    }

    fn existing(&self, run_id: &str, file: &str) -> ResultsResult<PathBuf> {
        let path = self.run_dir(run_id).join(file);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(path)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        read_bundle(&self.existing(run_id, "manifest.json")?)
    }

    pub fn load_summary(&self, run_id: &str) -> ResultsResult<AnnualSummary> {
        read_bundle(&self.existing(run_id, "summary.json")?)
    }

    pub fn load_pv_summary(&self, run_id: &str) -> ResultsResult<PvSummary> {
        read_bundle(&self.existing(run_id, "summary.json")?)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TimestepRecord>> {
        let content = fs::read_to_string(self.existing(run_id, "timeseries.jsonl")?)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line)?);
            }
        }
        Ok(records)
    }

    pub fn load_pv_outputs(&self, run_id: &str) -> ResultsResult<PvWattsOutputs> {
        read_bundle(&self.existing(run_id, "outputs.json")?)
    }

    /// Reassemble a saved CSP run.
    pub fn load_csp_run(&self, run_id: &str) -> ResultsResult<CspRunBundle> {
        Ok(CspRunBundle {
            manifest: self.load_manifest(run_id)?,
            summary: self.load_summary(run_id)?,
            design: read_bundle(&self.existing(run_id, "design.json")?)?,
            records: self.load_timeseries(run_id)?,
            diagnostics: read_bundle(&self.existing(run_id, "diagnostics.json")?)?,
        })
    }

    pub fn load_pv_run(&self, run_id: &str) -> ResultsResult<PvRunBundle> {
        Ok(PvRunBundle {
            manifest: self.load_manifest(run_id)?,
            summary: self.load_pv_summary(run_id)?,
            outputs: self.load_pv_outputs(run_id)?,
        })
    }

    pub fn list_runs(&self, scenario_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.scenario_name == scenario_name
                {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// Write any result value as pretty-printed JSON.
pub fn write_bundle<T: Serialize + ?Sized>(path: &Path, value: &T) -> ResultsResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn read_bundle<T: DeserializeOwned>(path: &Path) -> ResultsResult<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
