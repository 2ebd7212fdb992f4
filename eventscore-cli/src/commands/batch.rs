//! The `batch` command: analyse every video directory of a run.

use crate::cli::BatchArgs;
use crate::commands::aggregate::{aggregate_json, print_aggregate};
use crate::commands::resolve_config;
use crate::error::CliResult;
use crate::output::{print_heading, print_info, print_success, print_warning};
use eventscore_core::run_batch;
use log::info;

pub fn run_batch_command(args: BatchArgs) -> CliResult<()> {
    let config = resolve_config(&args.policy)?;
    info!("Batch evaluation of {}", args.run_path.display());

    let summary = run_batch(&args.run_path, &config, args.jobs)?;
    let attempted = summary.completed.len() + summary.failed.len();

    let Some(report) = summary.report else {
        return Err(crate::cli_error!(
            "All {attempted} analyses in {} failed",
            args.run_path.display()
        ));
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&aggregate_json(&report))?);
        return Ok(());
    }

    print_heading(&format!("Batch: {}", args.run_path.display()));
    print_info("Analysed", format!("{} of {attempted}", summary.completed.len()));
    for (name, error) in &summary.failed {
        print_warning(&format!("{name}: {error}"));
    }
    print_aggregate(&report);
    if summary.failed.is_empty() {
        print_success(&format!("{} analyses completed", summary.completed.len()));
    }
    Ok(())
}
