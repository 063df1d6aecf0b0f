// ============================================================
// Layer 6 — Experiment Tracker
// ============================================================
// A local, file-based experiment store using the MLflow
// file-store directory layout, so runs can be browsed by hand
// or compared with the `runs` command.
//
//   mlruns/
//     <experiment_id>/
//       meta.json                    ← name, id, creation time
//       <run_id>/
//         meta.json                  ← run name, status, times
//         params/<key>               ← the value, as text
//         metrics/<key>              ← "<timestamp_ms> <value> <step>" lines
//         artifacts/...              ← copied files and directories
//
// Params are write-once per run. Metrics are append-only
// histories; the latest line is the current value.
//
// A run that is dropped without finish() is marked FAILED.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use uuid::Uuid;

const META_FILE:     &str = "meta.json";
const PARAMS_DIR:    &str = "params";
const METRICS_DIR:   &str = "metrics";
const ARTIFACTS_DIR: &str = "artifacts";

/// Error returned by the experiment tracker.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Key contains characters outside `[A-Za-z0-9_./ -]` or escapes the run.
    #[error("invalid key '{0}': use alphanumerics, '_', '-', '.', '/', ' ' and no '..'")]
    InvalidKey(String),
    /// A param was logged twice with different values.
    #[error("param '{key}' is already '{existing}', cannot change it to '{attempted}'")]
    ParamConflict {
        key:       String,
        existing:  String,
        attempted: String,
    },
    /// Filesystem failure.
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    /// The artifact directory lies inside the directory being copied.
    #[error("cannot copy '{}' into '{}', which lies inside it", src.display(), dest.display())]
    NestedArtifacts {
        src:  PathBuf,
        dest: PathBuf,
    },
    /// A meta.json file could not be parsed or written.
    #[error("bad metadata at '{}': {source}", path.display())]
    Metadata {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, TrackingError>;

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> TrackingError + '_ {
    move |source| TrackingError::Io { path: path.to_path_buf(), source }
}

// ─── Records ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id:     String,
    pub name:              String,
    pub artifact_location: PathBuf,
    pub lifecycle_stage:   String,
    pub creation_time:     i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running  => "RUNNING",
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed   => "FAILED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id:        String,
    pub run_name:      String,
    pub experiment_id: String,
    pub status:        RunStatus,
    pub start_time:    i64,
    pub end_time:      Option<i64>,
    pub artifact_uri:  PathBuf,
}

/// A run as read back from disk, with the latest value of each metric.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub info:    RunInfo,
    pub params:  BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
}

// ─── ExperimentTracker ────────────────────────────────────────────────────────
pub struct ExperimentTracker {
    root: PathBuf,
}

impl ExperimentTracker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the experiment called `name`, creating it if needed.
    pub fn set_experiment(&self, name: &str) -> Result<Experiment> {
        if let Some(existing) = self.get_experiment_by_name(name)? {
            tracing::debug!("Using experiment '{}' (id {})", name, existing.experiment_id);
            return Ok(existing);
        }

        let next_id = self
            .list_experiments()?
            .iter()
            .filter_map(|e| e.experiment_id.parse::<u64>().ok())
            .max()
            .map_or(0, |id| id + 1);

        let experiment_id = next_id.to_string();
        let dir = self.root.join(&experiment_id);
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        let experiment = Experiment {
            experiment_id,
            name:              name.to_string(),
            artifact_location: dir.clone(),
            lifecycle_stage:   "active".to_string(),
            creation_time:     Utc::now().timestamp_millis(),
        };
        write_meta(&dir.join(META_FILE), &experiment)?;

        tracing::info!("Created experiment '{}' (id {})", name, experiment.experiment_id);
        Ok(experiment)
    }

    pub fn get_experiment_by_name(&self, name: &str) -> Result<Option<Experiment>> {
        Ok(self.list_experiments()?.into_iter().find(|e| e.name == name))
    }

    /// All experiments under the root, ordered by id.
    pub fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let mut out: Vec<Experiment> = Vec::new();
        for dir in subdirs(&self.root)? {
            let meta = dir.join(META_FILE);
            if meta.is_file() {
                out.push(read_meta(&meta)?);
            }
        }
        out.sort_by_key(|e| (e.experiment_id.parse::<u64>().unwrap_or(u64::MAX), e.experiment_id.clone()));
        Ok(out)
    }

    pub fn start_run(&self, experiment: &Experiment, run_name: &str) -> Result<ActiveRun> {
        let run_id = Uuid::new_v4().simple().to_string();
        let dir    = self.root.join(&experiment.experiment_id).join(&run_id);

        for sub in [PARAMS_DIR, METRICS_DIR, ARTIFACTS_DIR] {
            let path = dir.join(sub);
            fs::create_dir_all(&path).map_err(io_err(&path))?;
        }

        let info = RunInfo {
            run_id,
            run_name:      run_name.to_string(),
            experiment_id: experiment.experiment_id.clone(),
            status:        RunStatus::Running,
            start_time:    Utc::now().timestamp_millis(),
            end_time:      None,
            artifact_uri:  dir.join(ARTIFACTS_DIR),
        };
        write_meta(&dir.join(META_FILE), &info)?;

        tracing::info!("Started run '{}' ({})", info.run_name, info.run_id);
        Ok(ActiveRun { info, dir, finished: false })
    }

    /// Runs of `experiment`, newest first.
    pub fn list_runs(&self, experiment: &Experiment) -> Result<Vec<RunSummary>> {
        let mut runs = Vec::new();
        for dir in subdirs(&self.root.join(&experiment.experiment_id))? {
            let meta = dir.join(META_FILE);
            if !meta.is_file() {
                continue;
            }
            runs.push(RunSummary {
                info:    read_meta(&meta)?,
                params:  read_params(&dir.join(PARAMS_DIR))?,
                metrics: read_latest_metrics(&dir.join(METRICS_DIR))?,
            });
        }
        runs.sort_by(|a, b| b.info.start_time.cmp(&a.info.start_time));
        Ok(runs)
    }
}

// ─── ActiveRun ────────────────────────────────────────────────────────────────
pub struct ActiveRun {
    info:     RunInfo,
    dir:      PathBuf,
    finished: bool,
}

impl ActiveRun {
    pub fn info(&self) -> &RunInfo {
        &self.info
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.info.artifact_uri
    }

    /// Record a param. Logging the same value again is a no-op.
    pub fn log_param(&self, key: &str, value: impl fmt::Display) -> Result<()> {
        validate_key(key)?;
        let path  = self.dir.join(PARAMS_DIR).join(key);
        let value = value.to_string();

        if path.is_file() {
            let existing = fs::read_to_string(&path).map_err(io_err(&path))?;
            if existing != value {
                return Err(TrackingError::ParamConflict {
                    key: key.to_string(),
                    existing,
                    attempted: value,
                });
            }
            return Ok(());
        }

        ensure_parent(&path)?;
        fs::write(&path, &value).map_err(io_err(&path))?;
        tracing::debug!("param {} = {}", key, value);
        Ok(())
    }

    pub fn log_metric(&self, key: &str, value: f64) -> Result<()> {
        self.log_metric_at_step(key, value, 0)
    }

    /// Append one point to the metric's history.
    pub fn log_metric_at_step(&self, key: &str, value: f64, step: u64) -> Result<()> {
        validate_key(key)?;
        let path = self.dir.join(METRICS_DIR).join(key);
        ensure_parent(&path)?;

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(&path))?;
        writeln!(f, "{} {} {}", Utc::now().timestamp_millis(), value, step)
            .map_err(io_err(&path))?;

        tracing::debug!("metric {} = {} (step {})", key, value, step);
        Ok(())
    }

    /// Copy one file into the artifact directory, under `artifact_path` if given.
    pub fn log_artifact(&self, local_file: &Path, artifact_path: Option<&str>) -> Result<()> {
        let dest_dir = self.artifact_subdir(artifact_path)?;
        let name = local_file.file_name().ok_or_else(|| TrackingError::InvalidKey(
            local_file.display().to_string(),
        ))?;
        let dest = dest_dir.join(name);
        fs::create_dir_all(&dest_dir).map_err(io_err(&dest_dir))?;
        fs::copy(local_file, &dest).map_err(io_err(local_file))?;
        tracing::debug!("artifact {} → {}", local_file.display(), dest.display());
        Ok(())
    }

    /// Copy the contents of `local_dir` into the artifact directory.
    pub fn log_artifacts(&self, local_dir: &Path, artifact_path: Option<&str>) -> Result<()> {
        let dest_dir = self.artifact_subdir(artifact_path)?;

        let src  = fs::canonicalize(local_dir).map_err(io_err(local_dir))?;
        let root = fs::canonicalize(&self.info.artifact_uri).map_err(io_err(&self.info.artifact_uri))?;
        if root.starts_with(&src) {
            return Err(TrackingError::NestedArtifacts { src, dest: root });
        }

        copy_dir(local_dir, &dest_dir)?;
        tracing::debug!("artifacts {} → {}", local_dir.display(), dest_dir.display());
        Ok(())
    }

    /// Mark the run FINISHED.
    pub fn finish(mut self) -> Result<RunInfo> {
        self.close(RunStatus::Finished)?;
        Ok(self.info.clone())
    }

    fn artifact_subdir(&self, artifact_path: Option<&str>) -> Result<PathBuf> {
        match artifact_path {
            Some(sub) => {
                validate_key(sub)?;
                Ok(self.info.artifact_uri.join(sub))
            }
            None => Ok(self.info.artifact_uri.clone()),
        }
    }

    fn close(&mut self, status: RunStatus) -> Result<()> {
        self.info.status   = status;
        self.info.end_time = Some(Utc::now().timestamp_millis());
        self.finished      = true;
        write_meta(&self.dir.join(META_FILE), &self.info)?;
        tracing::info!("Run '{}' {}", self.info.run_name, status);
        Ok(())
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.close(RunStatus::Failed) {
                tracing::warn!("Could not mark run {} as failed: {}", self.info.run_id, e);
            }
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────
fn validate_key(key: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ' ');
    if key.is_empty() || key.starts_with('/') || key.contains("..") || !key.chars().all(allowed) {
        return Err(TrackingError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    Ok(())
}

fn subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if path.is_dir() {
            out.push(path);
        }
    }
    Ok(out)
}

fn write_meta<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| TrackingError::Metadata { path: path.to_path_buf(), source })?;
    fs::write(path, json).map_err(io_err(path))
}

fn read_meta<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(io_err(path))?;
    serde_json::from_str(&json)
        .map_err(|source| TrackingError::Metadata { path: path.to_path_buf(), source })
}

/// Keys may contain '/', so walk nested directories.
fn collect_files(base: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            let key = rel.to_string_lossy().replace('\\', "/");
            out.push((key, path));
        }
    }
    Ok(())
}

fn read_params(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut files = Vec::new();
    collect_files(dir, dir, &mut files)?;
    files
        .into_iter()
        .map(|(key, path)| Ok((key, fs::read_to_string(&path).map_err(io_err(&path))?)))
        .collect()
}

fn read_latest_metrics(dir: &Path) -> Result<BTreeMap<String, f64>> {
    let mut files = Vec::new();
    collect_files(dir, dir, &mut files)?;

    let mut out = BTreeMap::new();
    for (key, path) in files {
        let history = fs::read_to_string(&path).map_err(io_err(&path))?;
        let latest  = history
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .filter_map(|v| v.parse::<f64>().ok())
            .last();
        if let Some(value) = latest {
            out.insert(key, value);
        }
    }
    Ok(out)
}

fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(io_err(dest))?;
    for entry in fs::read_dir(src).map_err(io_err(src))? {
        let path   = entry.map_err(io_err(src))?.path();
        let target = dest.join(path.file_name().unwrap_or_default());
        if path.is_dir() {
            copy_dir(&path, &target)?;
        } else {
            fs::copy(&path, &target).map_err(io_err(&path))?;
        }
    }
    Ok(())
}
