//! JSON export of session results.
//!
//! The engine's report types stay free of serialization concerns; this
//! module mirrors them in serde-friendly shapes.

use crate::session::DareRun;
use errdare_sim::{Config, RunReport};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::fs;
use std::path::Path;

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

/// Errors from export operations.
#[derive(Debug, Snafu)]
pub enum ExportError {
    #[snafu(display("I/O error"), context(false))]
    Io { source: std::io::Error },

    #[snafu(display("JSON error"), context(false))]
    Json { source: serde_json::Error },
}

/// Policy flags of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableConfig {
    pub ignore_abort_order: bool,
    pub require_release_on_abort: bool,
    pub soft_fail: bool,
}

impl From<&Config> for SerializableConfig {
    fn from(config: &Config) -> Self {
        Self {
            ignore_abort_order: config.ignore_abort_order,
            require_release_on_abort: config.require_release_on_abort,
            soft_fail: config.soft_fail,
        }
    }
}

impl From<&SerializableConfig> for Config {
    fn from(config: &SerializableConfig) -> Self {
        Config {
            ignore_abort_order: config.ignore_abort_order,
            require_release_on_abort: config.require_release_on_abort,
            soft_fail: config.soft_fail,
        }
    }
}

/// One violation, flattened to its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableViolation {
    pub execution: usize,
    pub key: Option<String>,
    pub message: String,
    pub skipped: bool,
}

/// Outcome counters of one operation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableKey {
    pub key: String,
    pub reached: u64,
    pub no_fault: u64,
    pub faults: u64,
    pub aborts: u64,
}

/// One dare run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableRun {
    pub dare: String,
    pub solution: String,
    pub config: SerializableConfig,
    pub executions: usize,
    pub passed: bool,
    pub violations: Vec<SerializableViolation>,
    pub keys: Vec<SerializableKey>,
}

impl SerializableRun {
    fn from_report(dare: String, solution: String, report: &RunReport) -> Self {
        Self {
            dare,
            solution,
            config: (&report.config).into(),
            executions: report.executions,
            passed: report.passed(),
            violations: report
                .violations
                .iter()
                .map(|v| SerializableViolation {
                    execution: v.execution,
                    key: v.violation.key().map(str::to_string),
                    message: v.violation.to_string(),
                    skipped: v.skipped,
                })
                .collect(),
            keys: report
                .keys
                .iter()
                .map(|(key, rec)| SerializableKey {
                    key: key.clone(),
                    reached: rec.reached,
                    no_fault: rec.no_fault,
                    faults: rec.faults,
                    aborts: rec.aborts,
                })
                .collect(),
        }
    }
}

impl From<&DareRun> for SerializableRun {
    fn from(run: &DareRun) -> Self {
        Self::from_report(run.dare.to_string(), run.solution.to_string(), &run.report)
    }
}

/// Everything a session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub version: u32,
    pub runs: Vec<SerializableRun>,
}

impl SessionExport {
    pub fn from_runs(runs: &[DareRun]) -> Self {
        Self {
            version: EXPORT_VERSION,
            runs: runs.iter().map(SerializableRun::from).collect(),
        }
    }

    /// Number of runs that failed.
    pub fn failed_runs(&self) -> usize {
        self.runs.iter().filter(|r| !r.passed).count()
    }
}

/// Save a session export to a JSON file.
pub fn save_export<P: AsRef<Path>>(path: P, export: &SessionExport) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a session export from a JSON file.
pub fn load_export<P: AsRef<Path>>(path: P) -> Result<SessionExport, ExportError> {
    let json = fs::read_to_string(path)?;
    let export = serde_json::from_str(&json)?;
    Ok(export)
}
