//! Per-run output files.
//!
//! An analysis directory holds:
//!
//! | File            | Content                                              |
//! |-----------------|------------------------------------------------------|
//! | `TP.txt`        | `begin end` (ms) of the event, once per matched pair |
//! | `FP.txt`        | `begin end` (ms) of every unmatched event            |
//! | `FN.txt`        | `begin end` (ms) of every missed scored truth        |
//! | `GT.txt`        | `1` or `0` per event, in event order                 |
//! | `analysis.json` | [`AnalysisRecord`], read back by aggregation         |
//! | `report.txt`    | the plain-text statistics report                     |

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{EvaluationConfig, MatchingPolicy};
use crate::error::{CoreResult, io_error_at};
use crate::matcher::{Evaluation, MatchOutcome};
use crate::media::VideoInfo;
use crate::statistics::StatsTable;
use crate::time::Timestamp;

/// Name of the analysis directory inside a run directory.
pub const ANALYSIS_DIR: &str = "analysis";

pub const TRUE_POSITIVES_FILE: &str = "TP.txt";
pub const FALSE_POSITIVES_FILE: &str = "FP.txt";
pub const FALSE_NEGATIVES_FILE: &str = "FN.txt";
pub const EVENT_LABELS_FILE: &str = "GT.txt";
pub const ANALYSIS_RECORD_FILE: &str = "analysis.json";
pub const REPORT_FILE: &str = "report.txt";

/// Persisted result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Run name, usually the run directory name.
    pub name: String,
    pub evaluation: Evaluation,
    pub video_duration_ms: Option<i64>,
    pub policy: MatchingPolicy,
    pub event_name: String,
    pub ambiguous_name: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        name: impl Into<String>,
        evaluation: Evaluation,
        video: Option<&VideoInfo>,
        config: &EvaluationConfig,
    ) -> Self {
        Self {
            name: name.into(),
            evaluation,
            video_duration_ms: video.map(|v| v.duration.as_millis()),
            policy: config.policy,
            event_name: config.event_name.clone(),
            ambiguous_name: config.ambiguous_name.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn video_duration(&self) -> Option<Timestamp> {
        self.video_duration_ms.map(Timestamp::from_millis)
    }

    pub fn stats_table(&self) -> StatsTable {
        StatsTable::build(&self.evaluation, self.video_duration())
    }

    /// Reads an `analysis.json` file.
    pub fn read(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| io_error_at(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write(&self, path: &Path) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| io_error_at(path, e))
    }
}

/// Paths of the files written for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub true_positives: PathBuf,
    pub false_positives: PathBuf,
    pub false_negatives: PathBuf,
    pub event_labels: PathBuf,
    pub record: PathBuf,
    pub report: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            true_positives: dir.join(TRUE_POSITIVES_FILE),
            false_positives: dir.join(FALSE_POSITIVES_FILE),
            false_negatives: dir.join(FALSE_NEGATIVES_FILE),
            event_labels: dir.join(EVENT_LABELS_FILE),
            record: dir.join(ANALYSIS_RECORD_FILE),
            report: dir.join(REPORT_FILE),
        }
    }
}

fn create(path: &Path) -> CoreResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| io_error_at(path, e))?;
    Ok(BufWriter::new(file))
}

fn write_span(out: &mut impl Write, begin: Timestamp, end: Timestamp) -> std::io::Result<()> {
    writeln!(out, "{} {}", begin.as_millis(), end.as_millis())
}

/// Writes the TP/FP/FN/GT interval lists.
pub fn write_interval_lists(paths: &ArtifactPaths, outcome: &MatchOutcome) -> CoreResult<()> {
    let mut tp = create(&paths.true_positives)?;
    let mut gt = create(&paths.event_labels)?;
    for entry in &outcome.events {
        for _ in &entry.matched_truths {
            write_span(&mut tp, entry.event.begin, entry.event.end)?;
        }
        writeln!(gt, "{}", u8::from(entry.is_match()))?;
    }
    tp.flush()?;
    gt.flush()?;

    let mut fp = create(&paths.false_positives)?;
    for event in outcome.false_positives() {
        write_span(&mut fp, event.begin, event.end)?;
    }
    fp.flush()?;

    let mut fn_ = create(&paths.false_negatives)?;
    for truth in outcome.false_negatives() {
        write_span(&mut fn_, truth.begin, truth.end)?;
    }
    fn_.flush()?;

    Ok(())
}

/// Writes every artifact of one analysis into `dir`, creating it if needed.
pub fn write_artifacts(
    dir: &Path,
    outcome: &MatchOutcome,
    record: &AnalysisRecord,
) -> CoreResult<ArtifactPaths> {
    fs::create_dir_all(dir).map_err(|e| io_error_at(dir, e))?;
    let paths = ArtifactPaths::in_dir(dir);

    write_interval_lists(&paths, outcome)?;
    record.write(&paths.record)?;

    let report = record.stats_table().format_report();
    fs::write(&paths.report, report).map_err(|e| io_error_at(&paths.report, e))?;

    debug!("Wrote {} and interval lists", paths.record.display());
    info!("Analysis written to {}", dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Event, Truth};
    use crate::config::EvaluationConfigBuilder;
    use crate::matcher::EventMatcher;

    fn ms(value: i64) -> Timestamp {
        Timestamp::from_millis(value)
    }

    fn sample_outcome(config: &EvaluationConfig) -> MatchOutcome {
        let truths = vec![
            Truth::new(1, ms(10_000), ms(20_000)),
            Truth::new(2, ms(100_000), ms(110_000)),
            Truth::new(3, ms(200_000), ms(210_000)).ambiguous(),
        ];
        let events = vec![
            Event::new(ms(12_000), ms(13_000)),
            Event::new(ms(50_000), ms(51_000)),
            Event::new(ms(201_000), ms(202_000)),
        ];
        EventMatcher::new(config.policy).match_events(&truths, &events)
    }

    #[test]
    fn test_write_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("run1").join(ANALYSIS_DIR);
        let config = EvaluationConfigBuilder::new().build();
        let outcome = sample_outcome(&config);
        let record = AnalysisRecord::new("run1", outcome.evaluation, None, &config);

        let paths = write_artifacts(&dir, &outcome, &record).unwrap();

        let read = |p: &Path| fs::read_to_string(p).unwrap();
        assert_eq!(read(&paths.true_positives), "12000 13000\n201000 202000\n");
        assert_eq!(read(&paths.false_positives), "50000 51000\n");
        assert_eq!(read(&paths.false_negatives), "100000 110000\n");
        assert_eq!(read(&paths.event_labels), "1\n0\n1\n");
        assert!(read(&paths.report).starts_with("Counters"));

        let loaded = AnalysisRecord::read(&paths.record).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_record_video_duration() {
        let config = EvaluationConfigBuilder::new().build();
        let video = VideoInfo {
            duration: ms(3_600_000),
            start_timestamp: None,
        };
        let record = AnalysisRecord::new("cam", Evaluation::default(), Some(&video), &config);
        assert_eq!(record.video_duration(), Some(ms(3_600_000)));
        assert!(record.stats_table().get("False alarm rate").is_some());
    }

    #[test]
    fn test_read_missing_record() {
        assert!(AnalysisRecord::read(Path::new("/no/such/analysis.json")).is_err());
    }
}
