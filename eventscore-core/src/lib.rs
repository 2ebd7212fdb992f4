//! Core library for scoring video-analytics detections against ground truth.
//!
//! Detections ("events") and human annotations ("truths") are read from
//! SubRip files. Each truth gets a matching window derived from a
//! delay/tolerance policy; an event matches every truth whose window
//! contains its representative time. The result is a set of counters
//! ([`Evaluation`]) from which recall, precision, F-score and the false
//! alarm rate are derived.
//!
//! ## Usage Example
//!
//! ```rust
//! use eventscore_core::{Event, EventMatcher, MatchingPolicy, StatsTable, Timestamp, Truth};
//!
//! let truths = vec![Truth::new(
//!     1,
//!     Timestamp::from_millis(10_000),
//!     Timestamp::from_millis(20_000),
//! )];
//! let events = vec![
//!     Event::new(Timestamp::from_millis(9_000), Timestamp::from_millis(9_500)),
//!     Event::new(Timestamp::from_millis(60_000), Timestamp::from_millis(61_000)),
//! ];
//!
//! let matcher = EventMatcher::new(MatchingPolicy::new(0.0, 3.0, false));
//! let evaluation = matcher.evaluate(&truths, &events);
//! assert_eq!(evaluation.true_positive, 1);
//! assert_eq!(evaluation.false_positive, 1);
//!
//! println!("{}", StatsTable::build(&evaluation, None));
//! ```

pub mod aggregate;
pub mod analysis;
pub mod annotations;
pub mod artifacts;
pub mod batch;
pub mod config;
pub mod error;
pub mod file_logging;
pub mod matcher;
pub mod media;
pub mod statistics;
pub mod subrip;
pub mod time;

// Re-exports for public API
pub use aggregate::{AggregateReport, aggregate, list_analyses};
pub use analysis::{AnalysisJob, AnalysisRun, run_analysis};
pub use annotations::{Event, IntervalId, LabelFilter, Truth, load_events, load_truths};
pub use artifacts::{AnalysisRecord, ArtifactPaths, write_artifacts};
pub use batch::{BatchSummary, discover_jobs, run_batch};
pub use config::{
    EvaluationConfig, EvaluationConfigBuilder, EventAnchor, MatchingPolicy, StartTimestamp,
};
pub use error::{CoreError, CoreResult};
pub use matcher::{Evaluation, EventMatcher, MatchOutcome, MatchSet, MatchWindow};
pub use media::{VideoInfo, probe_video, start_timestamp_from_filename};
pub use statistics::{Statistics, StatsTable};
pub use subrip::Subtitle;
pub use time::Timestamp;
