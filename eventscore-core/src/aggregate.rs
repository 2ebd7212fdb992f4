//! Aggregation of finished analyses across the videos of a run.
//!
//! A run directory contains one sub-directory per video; each finished
//! analysis leaves `<video>/analysis/analysis.json` behind.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::artifacts::{ANALYSIS_DIR, ANALYSIS_RECORD_FILE, AnalysisRecord};
use crate::error::{CoreError, CoreResult, io_error_at};
use crate::matcher::Evaluation;
use crate::statistics::StatsTable;
use crate::time::Timestamp;

/// Analyses of a run and their total.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    /// Sorted by name.
    pub runs: Vec<AnalysisRecord>,
    pub total: Evaluation,
    /// Sum of the video durations, only when every run has one.
    pub total_duration: Option<Timestamp>,
}

impl AggregateReport {
    pub fn from_records(mut runs: Vec<AnalysisRecord>) -> Self {
        runs.sort_by(|a, b| a.name.cmp(&b.name));

        let total: Evaluation = runs.iter().map(|r| r.evaluation).sum();
        let total_duration = runs
            .iter()
            .map(AnalysisRecord::video_duration)
            .sum::<Option<Timestamp>>()
            .filter(|_| !runs.is_empty());

        Self {
            runs,
            total,
            total_duration,
        }
    }

    pub fn total_table(&self) -> StatsTable {
        StatsTable::build(&self.total, self.total_duration)
    }
}

/// Names of the sub-directories of `run_path` holding a finished analysis,
/// sorted.
pub fn list_analyses(run_path: &Path) -> CoreResult<Vec<String>> {
    let read_dir = fs::read_dir(run_path).map_err(|e| io_error_at(run_path, e))?;
    let mut names: Vec<String> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !record_path(&path).is_file() {
                return None;
            }
            Some(entry.file_name().to_string_lossy().into_owned())
        })
        .collect();
    names.sort();
    Ok(names)
}

/// Location of the analysis record of a run sub-directory.
pub fn record_path(run_dir: &Path) -> PathBuf {
    run_dir.join(ANALYSIS_DIR).join(ANALYSIS_RECORD_FILE)
}

/// Loads every finished analysis of `run_path` in parallel and totals them.
///
/// Unreadable records are logged and skipped. Fails when nothing could be
/// loaded.
pub fn aggregate(run_path: &Path) -> CoreResult<AggregateReport> {
    let names = list_analyses(run_path)?;
    debug!("Found {} analyses in {}", names.len(), run_path.display());

    let records: Vec<AnalysisRecord> = names
        .par_iter()
        .filter_map(|name| {
            let path = record_path(&run_path.join(name));
            match AnalysisRecord::read(&path) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping analysis {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    if records.is_empty() {
        return Err(CoreError::NoAnalysesFound(run_path.display().to_string()));
    }
    Ok(AggregateReport::from_records(records))
}
