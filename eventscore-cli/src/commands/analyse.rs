// ============================================================================
// eventscore-cli/src/commands/analyse.rs
// ============================================================================
//
// ANALYSE COMMAND: score one event file against one ground truth
//
// Loads both SubRip files, matches them under the resolved policy, prints the
// statistics report (text or JSON) and, with --output, writes the analysis
// artifacts next to the log file.

use crate::cli::AnalyseArgs;
use crate::commands::resolve_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{print_heading, print_info, print_section, print_stats_table, print_success};
use eventscore_core::statistics::Statistics;
use eventscore_core::{AnalysisJob, AnalysisRun, run_analysis};
use log::{info, warn};
use std::path::Path;

/// Run name: the video file stem, else the directory of the event file.
fn run_name(args: &AnalyseArgs) -> String {
    let from_video = args
        .video
        .as_deref()
        .and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned());
    let from_events = || {
        args.event_file
            .canonicalize()
            .ok()
            .and_then(|p| p.parent().and_then(Path::file_name).map(|n| n.to_string_lossy().into_owned()))
    };
    from_video
        .or_else(from_events)
        .unwrap_or_else(|| "analysis".to_string())
}

pub fn run_analyse(args: AnalyseArgs) -> CliResult<()> {
    let config = resolve_config(&args.policy)?;

    for (label, path) in [("Event", &args.event_file), ("Ground truth", &args.truth_file)] {
        if !path.is_file() {
            warn!("{label} file {} does not exist, treating as empty", path.display());
        }
    }

    let name = run_name(&args);
    info!("Analysing {} against {}", args.event_file.display(), args.truth_file.display());
    let job = AnalysisJob::new(name, &args.event_file, &args.truth_file)
        .with_video(args.video.clone())
        .with_output_dir(args.output.clone());
    let run = run_analysis(&job, &config).cli_context("Analysis failed")?;

    if args.json {
        print_json(&run)
    } else {
        print_text(&args, &run);
        Ok(())
    }
}

fn print_json(run: &AnalysisRun) -> CliResult<()> {
    let record = &run.record;
    let document = serde_json::json!({
        "name": record.name,
        "evaluation": record.evaluation,
        "statistics": Statistics::derive(&record.evaluation, record.video_duration()),
        "video_duration_ms": record.video_duration_ms,
        "policy": record.policy,
        "event_name": record.event_name,
        "ambiguous_name": record.ambiguous_name,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn print_text(args: &AnalyseArgs, run: &AnalysisRun) {
    print_heading(&format!("Analysis: {}", run.record.name));
    print_info("Events", args.event_file.display());
    print_info("Ground truth", args.truth_file.display());
    if let Some(video) = &run.video {
        print_info("Video duration", video.duration);
        if let Some(start) = video.start_timestamp {
            print_info("Video start", start);
        }
    }
    let policy = &run.record.policy;
    print_info(
        "Policy",
        format!(
            "delay {}s, tolerance {}s, {}, anchor {}",
            policy.delay_seconds,
            policy.tolerance_seconds,
            if policy.uncompromising { "uncompromising" } else { "lenient" },
            policy.anchor
        ),
    );

    print_section("Results");
    print_stats_table(&run.stats_table());

    if let Some(paths) = &run.artifacts {
        println!();
        print_success(&format!("Report written to {}", paths.report.display()));
    }
}
