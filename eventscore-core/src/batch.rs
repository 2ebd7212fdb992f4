//! Batch evaluation of every video of a run directory.
//!
//! Each sub-directory holding `event.srt` and `ground_truth.srt` is one job.
//! A video file next to them (first by name among the known extensions)
//! provides the duration and the start timestamp.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};
use rayon::prelude::*;

use crate::aggregate::{AggregateReport, aggregate};
use crate::analysis::{AnalysisJob, run_analysis};
use crate::artifacts::ANALYSIS_DIR;
use crate::config::EvaluationConfig;
use crate::error::{CoreError, CoreResult, io_error_at};

pub const EVENT_FILE: &str = "event.srt";
pub const TRUTH_FILE: &str = "ground_truth.srt";

/// Extensions recognised as videos, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "webm"];

/// Result of a batch.
#[derive(Debug)]
pub struct BatchSummary {
    /// Names of the runs analysed successfully, sorted.
    pub completed: Vec<String>,
    /// Runs that failed, with the error message.
    pub failed: Vec<(String, String)>,
    /// Aggregation of the run directory after the batch.
    pub report: Option<AggregateReport>,
}

fn find_video(dir: &Path) -> Option<PathBuf> {
    let mut videos: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
                .map(|_| path.clone())
        })
        .collect();
    videos.sort();
    videos.into_iter().next()
}

/// Lists the jobs of a run directory, sorted by name.
pub fn discover_jobs(run_path: &Path) -> CoreResult<Vec<AnalysisJob>> {
    let read_dir = fs::read_dir(run_path).map_err(|e| io_error_at(run_path, e))?;
    let mut jobs: Vec<AnalysisJob> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let dir = entry.path();
            let event_file = dir.join(EVENT_FILE);
            let truth_file = dir.join(TRUTH_FILE);
            if !event_file.is_file() || !truth_file.is_file() {
                return None;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            Some(
                AnalysisJob::new(name, &event_file, &truth_file)
                    .with_video(find_video(&dir))
                    .with_output_dir(Some(dir.join(ANALYSIS_DIR))),
            )
        })
        .collect();
    jobs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(jobs)
}

/// Analyses every job of `run_path` on `jobs` threads (0 picks the number
/// of CPUs), then aggregates the run directory.
pub fn run_batch(
    run_path: &Path,
    config: &EvaluationConfig,
    jobs: usize,
) -> CoreResult<BatchSummary> {
    config.validate()?;
    let analyses = discover_jobs(run_path)?;
    if analyses.is_empty() {
        return Err(CoreError::NoAnalysesFound(run_path.display().to_string()));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize thread pool: {e}")))?;
    info!(
        "Analysing {} videos with {} concurrent jobs",
        analyses.len(),
        pool.current_num_threads()
    );

    let results: Vec<(String, CoreResult<()>)> = pool.install(|| {
        analyses
            .par_iter()
            .map(|job| (job.name.clone(), run_analysis(job, config).map(|_| ())))
            .collect()
    });

    let mut completed = Vec::new();
    let mut failed = Vec::new();
    for (name, result) in results {
        match result {
            Ok(()) => completed.push(name),
            Err(e) => {
                error!("Analysis of {name} failed: {e}");
                failed.push((name, e.to_string()));
            }
        }
    }

    let report = if completed.is_empty() {
        None
    } else {
        Some(aggregate(run_path)?)
    };

    Ok(BatchSummary {
        completed,
        failed,
        report,
    })
}
