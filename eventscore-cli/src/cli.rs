// eventscore-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use eventscore_core::EventAnchor;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Eventscore: detection event evaluation",
    long_about = "Scores the events detected in a video against a ground-truth annotation \
                  and derives recall, precision, F-score and false alarm rate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluates one event file against one ground-truth file
    Analyse(AnalyseArgs),
    /// Evaluates every video directory of a run, then aggregates
    Batch(BatchArgs),
    /// Aggregates the finished analyses of a run
    Aggregate(AggregateArgs),
}

/// Matching policy options shared by `analyse` and `batch`.
///
/// Unset options keep the value of the configuration file, or the
/// `EVENTSCORE_*` environment defaults without one.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Label of the evaluated event class
    #[arg(short = 'e', long = "event-name", value_name = "NAME")]
    pub event_name: Option<String>,

    /// Label marking ambiguous ground-truth entries
    #[arg(short = 'a', long = "ambiguous-name", value_name = "NAME")]
    pub ambiguous_name: Option<String>,

    /// Delay (seconds) allowed after the end of a ground-truth entry
    #[arg(short = 'd', long = "delay", value_name = "SECONDS", allow_negative_numbers = true)]
    pub delay: Option<f64>,

    /// Tolerance (seconds) around ground-truth entries
    #[arg(short = 't', long = "tolerance", value_name = "SECONDS", allow_negative_numbers = true)]
    pub tolerance: Option<f64>,

    /// Reject detections earlier than delay - tolerance
    #[arg(short = 'u', long, default_value_t = false)]
    pub uncompromising: bool,

    /// Instant of a detection compared with the windows (begin, midpoint)
    #[arg(long, value_name = "ANCHOR")]
    pub anchor: Option<EventAnchor>,

    /// Offset (ms) subtracted from event stamps; negative detects it from
    /// the video file name
    #[arg(long = "start-timestamp", value_name = "MS", allow_negative_numbers = true)]
    pub start_timestamp: Option<i64>,

    /// JSON configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyseArgs {
    /// SubRip file written by the detector
    #[arg(required = true, value_name = "EVENT_FILE")]
    pub event_file: PathBuf,

    /// SubRip ground-truth annotation
    #[arg(required = true, value_name = "TRUTH_FILE")]
    pub truth_file: PathBuf,

    /// Analysed video, for duration and start timestamp
    #[arg(short = 'V', long, value_name = "VIDEO")]
    pub video: Option<PathBuf>,

    /// Directory receiving the analysis files and the log
    #[arg(short = 'o', long, value_name = "OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory holding one sub-directory per video
    #[arg(required = true, value_name = "RUN_PATH")]
    pub run_path: PathBuf,

    /// Concurrent analyses (0 uses every CPU)
    #[arg(short = 'j', long, value_name = "N", default_value_t = 0)]
    pub jobs: usize,

    /// Print the aggregation as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Directory holding one sub-directory per video
    #[arg(required = true, value_name = "RUN_PATH")]
    pub run_path: PathBuf,

    /// Print the aggregation as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Commands {
    /// Directory receiving the log file, if the command writes one.
    pub fn log_dir(&self) -> Option<PathBuf> {
        match self {
            Commands::Analyse(args) => args.output.clone(),
            Commands::Batch(args) => Some(args.run_path.clone()),
            Commands::Aggregate(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyse_basic_args() {
        let cli = Cli::parse_from(["eventscore", "analyse", "event.srt", "ground_truth.srt"]);
        assert!(!cli.verbose);
        match cli.command {
            Commands::Analyse(args) => {
                assert_eq!(args.event_file, PathBuf::from("event.srt"));
                assert_eq!(args.truth_file, PathBuf::from("ground_truth.srt"));
                assert!(args.video.is_none());
                assert!(args.output.is_none());
                assert!(!args.json);
                assert!(args.policy.delay.is_none());
                assert!(!args.policy.uncompromising);
            }
            other => panic!("Expected Analyse command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_analyse_policy_flags() {
        let cli = Cli::parse_from([
            "eventscore",
            "analyse",
            "e.srt",
            "t.srt",
            "-V",
            "20140101_120000_cam.mp4",
            "-e",
            "intrusion",
            "-a",
            "ambiguous",
            "-d",
            "5",
            "-t",
            "1.5",
            "-u",
            "--anchor",
            "midpoint",
            "--start-timestamp",
            "-1",
            "-o",
            "out",
            "--json",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.command.log_dir(), Some(PathBuf::from("out")));
        match cli.command {
            Commands::Analyse(args) => {
                assert_eq!(args.video, Some(PathBuf::from("20140101_120000_cam.mp4")));
                assert_eq!(args.policy.event_name.as_deref(), Some("intrusion"));
                assert_eq!(args.policy.ambiguous_name.as_deref(), Some("ambiguous"));
                assert_eq!(args.policy.delay, Some(5.0));
                assert_eq!(args.policy.tolerance, Some(1.5));
                assert!(args.policy.uncompromising);
                assert_eq!(args.policy.anchor, Some(EventAnchor::Midpoint));
                assert_eq!(args.policy.start_timestamp, Some(-1));
                assert!(args.json);
            }
            other => panic!("Expected Analyse command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_batch_and_aggregate() {
        let cli = Cli::parse_from(["eventscore", "batch", "run", "--jobs", "4", "-t", "2"]);
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.run_path, PathBuf::from("run"));
                assert_eq!(args.jobs, 4);
                assert_eq!(args.policy.tolerance, Some(2.0));
            }
            other => panic!("Expected Batch command, got {other:?}"),
        }

        let cli = Cli::parse_from(["eventscore", "aggregate", "run", "--json"]);
        assert_eq!(cli.command.log_dir(), None);
        match cli.command {
            Commands::Aggregate(args) => assert!(args.json),
            other => panic!("Expected Aggregate command, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_anchor() {
        let result = Cli::try_parse_from(["eventscore", "analyse", "e.srt", "t.srt", "--anchor", "end"]);
        assert!(result.is_err());
    }
}
