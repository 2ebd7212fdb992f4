//! The `aggregate` command: totals the finished analyses of a run.

use crate::cli::AggregateArgs;
use crate::error::CliResult;
use crate::output::{print_aggregate_table, print_heading, print_section, print_stats_table};
use eventscore_core::statistics::Statistics;
use eventscore_core::{AggregateReport, aggregate};
use serde_json::{Value, json};

pub fn run_aggregate(args: AggregateArgs) -> CliResult<()> {
    let report = aggregate(&args.run_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&aggregate_json(&report))?);
    } else {
        print_heading(&format!("Aggregate: {}", args.run_path.display()));
        print_aggregate(&report);
    }
    Ok(())
}

/// Per-run rows followed by the total report.
pub fn print_aggregate(report: &AggregateReport) {
    print_aggregate_table(report);
    print_section("Total");
    print_stats_table(&report.total_table());
}

pub fn aggregate_json(report: &AggregateReport) -> Value {
    let runs: Vec<Value> = report
        .runs
        .iter()
        .map(|run| {
            json!({
                "name": run.name,
                "evaluation": run.evaluation,
                "statistics": Statistics::derive(&run.evaluation, run.video_duration()),
                "video_duration_ms": run.video_duration_ms,
            })
        })
        .collect();

    json!({
        "runs": runs,
        "total": {
            "evaluation": report.total,
            "statistics": Statistics::derive(&report.total, report.total_duration),
            "video_duration_ms": report.total_duration.map(|d| d.as_millis()),
        },
    })
}
