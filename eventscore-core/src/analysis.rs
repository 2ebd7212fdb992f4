//! The analysis pipeline of a single video: load annotations, match, and
//! optionally write the run artifacts.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::annotations::{load_events, load_truths};
use crate::artifacts::{AnalysisRecord, ArtifactPaths, write_artifacts};
use crate::config::EvaluationConfig;
use crate::error::CoreResult;
use crate::matcher::{EventMatcher, MatchOutcome};
use crate::media::{VideoInfo, probe_video, resolve_start_offset};
use crate::statistics::StatsTable;

/// Inputs of one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub name: String,
    pub event_file: PathBuf,
    pub truth_file: PathBuf,
    pub video: Option<PathBuf>,
    /// Artifacts are written only when set.
    pub output_dir: Option<PathBuf>,
}

impl AnalysisJob {
    pub fn new(name: impl Into<String>, event_file: &Path, truth_file: &Path) -> Self {
        Self {
            name: name.into(),
            event_file: event_file.to_path_buf(),
            truth_file: truth_file.to_path_buf(),
            video: None,
            output_dir: None,
        }
    }

    #[must_use]
    pub fn with_video(mut self, video: Option<PathBuf>) -> Self {
        self.video = video;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }
}

/// Everything produced by [`run_analysis`].
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub record: AnalysisRecord,
    pub outcome: MatchOutcome,
    pub video: Option<VideoInfo>,
    pub artifacts: Option<ArtifactPaths>,
}

impl AnalysisRun {
    pub fn stats_table(&self) -> StatsTable {
        self.record.stats_table()
    }
}

/// Runs one analysis.
///
/// A video that cannot be probed only removes the video statistics. Missing
/// or malformed annotation files count as empty.
pub fn run_analysis(job: &AnalysisJob, config: &EvaluationConfig) -> CoreResult<AnalysisRun> {
    config.validate()?;

    let video = job.video.as_deref().and_then(|path| match probe_video(path) {
        Ok(info) => Some(info),
        Err(e) => {
            warn!("Continuing without video statistics: {e}");
            None
        }
    });
    let start_offset = resolve_start_offset(config.start_timestamp, job.video.as_deref());
    debug!("Start offset for {}: {}", job.name, start_offset);

    let truths = load_truths(&job.truth_file, &config.label_filter(), &config.policy);
    let events = load_events(&job.event_file, start_offset);
    info!(
        "{}: {} events against {} ground truth entries",
        job.name,
        events.len(),
        truths.len()
    );

    let outcome = EventMatcher::new(config.policy).match_events(&truths, &events);
    let record = AnalysisRecord::new(&job.name, outcome.evaluation, video.as_ref(), config);

    let artifacts = job
        .output_dir
        .as_deref()
        .map(|dir| write_artifacts(dir, &outcome, &record))
        .transpose()?;

    Ok(AnalysisRun {
        record,
        outcome,
        video,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EvaluationConfigBuilder, StartTimestamp};
    use std::fs;

    const TRUTH: &str = "1\n00:00:10,000 --> 00:00:20,000\nanor\n\n\
                         2\n00:01:00,000 --> 00:01:05,000\nother\n\n\
                         3\n00:02:00,000 --> 00:02:10,000\nanor\n";

    const EVENTS: &str = "1\n00:00:11,000 --> 00:00:12,000\n{}\n\n\
                          2\n00:05:00,000 --> 00:05:01,000\n{}\n";

    #[test]
    fn test_run_analysis_writes_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let truth = temp.path().join("ground_truth.srt");
        let events = temp.path().join("event.srt");
        fs::write(&truth, TRUTH).unwrap();
        fs::write(&events, EVENTS).unwrap();

        let out = temp.path().join("analysis");
        let job = AnalysisJob::new("cam", &events, &truth).with_output_dir(Some(out.clone()));
        let config = EvaluationConfigBuilder::new().build();
        let run = run_analysis(&job, &config).unwrap();

        let e = run.record.evaluation;
        assert_eq!(e.positives, 2);
        assert_eq!(e.true_positive, 1);
        assert_eq!(e.false_positive, 1);
        assert_eq!(e.false_negative, 1);
        assert!(run.video.is_none());
        assert!(out.join("analysis.json").is_file());
        assert!(run.artifacts.is_some());
    }

    #[test]
    fn test_run_analysis_applies_fixed_offset() {
        let temp = tempfile::tempdir().unwrap();
        let truth = temp.path().join("ground_truth.srt");
        let events = temp.path().join("event.srt");
        fs::write(&truth, TRUTH).unwrap();
        fs::write(&events, "1\n00:01:11,000 --> 00:01:12,000\n{}\n").unwrap();

        let job = AnalysisJob::new("cam", &events, &truth);
        let config = EvaluationConfigBuilder::new()
            .start_timestamp(StartTimestamp::Fixed(60_000))
            .build();
        let run = run_analysis(&job, &config).unwrap();
        assert_eq!(run.record.evaluation.true_positive, 1);
        assert!(run.artifacts.is_none());
    }

    #[test]
    fn test_run_analysis_rejects_invalid_config() {
        let job = AnalysisJob::new("cam", Path::new("e.srt"), Path::new("t.srt"));
        let config = EvaluationConfigBuilder::new().tolerance_seconds(-1.0).build();
        assert!(run_analysis(&job, &config).is_err());
    }

    #[test]
    fn test_unprobeable_video_is_not_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let job = AnalysisJob::new(
            "cam",
            &temp.path().join("event.srt"),
            &temp.path().join("ground_truth.srt"),
        )
        .with_video(Some(temp.path().join("missing.mp4")));
        let run = run_analysis(&job, &EvaluationConfigBuilder::new().build()).unwrap();
        assert!(run.video.is_none());
        assert_eq!(run.record.video_duration_ms, None);
    }
}
