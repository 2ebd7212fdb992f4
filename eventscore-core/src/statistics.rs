//! Rate statistics derived from an [`Evaluation`].
//!
//! Every ratio is guarded: a zero denominator yields `0`, an explicit
//! not-applicable value (detection rate) or a sentinel (false alarm rate),
//! never a panic, `NaN` or infinity.
//!
//! The F-score follows the weighted form used by the i-LIDS benchmark:
//! `(1 + β)·R·P / (R + β·P)` with `β = 0.5`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matcher::Evaluation;
use crate::time::Timestamp;

/// Recall bias of the F-score.
pub const F_SCORE_BETA: f64 = 0.5;

/// Reported false alarm rate when the video duration is zero.
pub const FALSE_ALARM_RATE_SENTINEL: f64 = 9999.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const HEADING_RULE_WIDTH: usize = 20;

/// `numerator / denominator`, or 0 when the denominator is 0.
#[must_use]
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Weighted harmonic mean of recall and precision, 0 when undefined.
#[must_use]
pub fn f_score(recall: f64, precision: f64, beta: f64) -> f64 {
    let denominator = recall + beta * precision;
    if denominator == 0.0 {
        0.0
    } else {
        (1.0 + beta) * recall * precision / denominator
    }
}

/// False positives per hour of video.
#[must_use]
pub fn false_alarm_rate(false_positive: usize, duration: Timestamp) -> f64 {
    if duration.as_millis() <= 0 {
        FALSE_ALARM_RATE_SENTINEL
    } else {
        false_positive as f64 * MILLIS_PER_HOUR / duration.as_millis() as f64
    }
}

/// Statistics that need the duration of the evaluated video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoStatistics {
    pub duration: Timestamp,
    /// Alarms per hour.
    pub false_alarm_rate: f64,
}

/// Rates derived from one evaluation. Ratios are fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// `None` when there are no scored truths.
    pub detection_rate: Option<f64>,
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
    pub video: Option<VideoStatistics>,
}

impl Statistics {
    pub fn derive(evaluation: &Evaluation, video_duration: Option<Timestamp>) -> Self {
        let e = evaluation;

        let detection_rate =
            (e.positives != 0).then(|| ratio(e.true_positive, e.positives));
        let recall = ratio(e.true_positive, e.true_positive + e.false_negative);
        let precision = ratio(e.true_positive, e.true_positive + e.false_positive);
        let f1 = f_score(recall, precision, F_SCORE_BETA);

        let video = video_duration.map(|duration| VideoStatistics {
            duration,
            false_alarm_rate: false_alarm_rate(e.false_positive, duration),
        });

        Self {
            detection_rate,
            recall,
            precision,
            f1,
            video,
        }
    }
}

/// How a statistics value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatFormat {
    /// Section rule
    Heading,
    /// Right-aligned integer, width 4
    Count,
    /// Two decimals followed by `%`
    Percent,
    /// Verbatim
    Text,
    /// Three decimals followed by `alarms/hour`
    AlarmsPerHour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatValue {
    Count(usize),
    Number(f64),
    Duration(Timestamp),
    Text(String),
}

impl StatValue {
    fn not_applicable() -> Self {
        StatValue::Text("N/A".to_string())
    }
}

/// One named row of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub name: String,
    pub value: StatValue,
    pub format: StatFormat,
}

impl StatRow {
    fn new(name: &str, value: StatValue, format: StatFormat) -> Self {
        Self {
            name: name.to_string(),
            value,
            format,
        }
    }

    fn heading(name: &str) -> Self {
        Self::new(name, StatValue::Text("-".repeat(HEADING_RULE_WIDTH)), StatFormat::Heading)
    }

    fn count(name: &str, count: usize) -> Self {
        Self::new(name, StatValue::Count(count), StatFormat::Count)
    }

    fn percent(name: &str, fraction: f64) -> Self {
        Self::new(name, StatValue::Number(fraction * 100.0), StatFormat::Percent)
    }

    pub fn is_heading(&self) -> bool {
        self.format == StatFormat::Heading
    }

    /// Formats the value according to the row's format.
    pub fn render(&self) -> String {
        match (&self.value, self.format) {
            (StatValue::Count(n), StatFormat::Count) => format!("{n:4}"),
            (StatValue::Number(v), StatFormat::Percent) => format!("{v:3.2}%"),
            (StatValue::Number(v), StatFormat::AlarmsPerHour) => format!("{v:.3} alarms/hour"),
            (StatValue::Count(n), _) => n.to_string(),
            (StatValue::Number(v), _) => v.to_string(),
            (StatValue::Duration(d), _) => d.to_string(),
            (StatValue::Text(s), _) => s.clone(),
        }
    }
}

/// Ordered statistics table, as shown in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    rows: Vec<StatRow>,
}

impl StatsTable {
    /// Builds the table for an evaluation. Video rows appear only when the
    /// video duration is known.
    pub fn build(evaluation: &Evaluation, video_duration: Option<Timestamp>) -> Self {
        let e = evaluation;
        let stats = Statistics::derive(e, video_duration);

        let mut rows = vec![
            StatRow::heading("Counters"),
            StatRow::count("Events", e.positives),
            StatRow::count("Detections", e.detected),
            StatRow::count("Correct detections", e.true_positive),
            StatRow::count("False alarms", e.false_positive),
            StatRow::count("Missed detections", e.false_negative),
            StatRow::count("Duplicated detections", e.duplicate_events),
            StatRow::count("Duplicated gt", e.duplicate_truths),
            StatRow::count("Ambiguous", e.ambiguous),
            StatRow::heading("Statistics"),
        ];

        rows.push(match stats.detection_rate {
            Some(rate) => StatRow::percent("Detected", rate),
            None => StatRow::new("Detected", StatValue::not_applicable(), StatFormat::Text),
        });
        rows.push(StatRow::percent("Recall", stats.recall));
        rows.push(StatRow::percent("Precision", stats.precision));
        rows.push(StatRow::percent("F1 score", stats.f1));

        if let Some(video) = stats.video {
            rows.push(StatRow::heading("Video related"));
            rows.push(StatRow::new(
                "Video duration",
                StatValue::Duration(video.duration),
                StatFormat::Text,
            ));
            rows.push(StatRow::new(
                "False alarm rate",
                StatValue::Number(video.false_alarm_rate),
                StatFormat::AlarmsPerHour,
            ));
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[StatRow] {
        &self.rows
    }

    pub fn get(&self, name: &str) -> Option<&StatRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Plain-text report: one `name : value` line per row, names padded to
    /// the longest one.
    pub fn format_report(&self) -> String {
        let width = self.rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
        self.rows
            .iter()
            .map(|row| format!("{:<width$} : {}\n", row.name, row.render()))
            .collect()
    }
}

impl fmt::Display for StatsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_report())
    }
}
