//! Terminal presentation of reports.

use console::style;
use eventscore_core::statistics::{Statistics, StatsTable};
use eventscore_core::{AggregateReport, Evaluation, Timestamp};
use std::fmt::Display;

/// Print a heading with styling and clear separation
pub fn print_heading(text: &str) {
    let line = "=".repeat(50);
    println!("\n{}", style(&line).blue().bright());
    println!("{}", style(format!(" {text} ")).bold().white().bright());
    println!("{}\n", style(&line).blue().bright());
}

/// Print a section heading (smaller than main heading)
pub fn print_section(text: &str) {
    let line = "-".repeat(40);
    println!("\n{}", style(&line).blue());
    println!("{}", style(format!(" {text} ")).bold().white());
    println!("{}", style(&line).blue());
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}: {}", style(label).cyan().bright(), value);
}

pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), style(message).yellow());
}

/// Print a statistics table; section rows are dimmed.
pub fn print_stats_table(table: &StatsTable) {
    let report = table.format_report();
    for (row, line) in table.rows().iter().zip(report.lines()) {
        if row.is_heading() {
            println!("{}", style(line).dim());
        } else {
            println!("{line}");
        }
    }
}

const AGGREGATE_COLUMNS: [&str; 8] = [
    "Events",
    "Detections",
    "TP",
    "FP",
    "FN",
    "Recall",
    "Precision",
    "F1",
];

fn aggregate_cells(e: &Evaluation, duration: Option<Timestamp>) -> Vec<String> {
    let stats = Statistics::derive(e, duration);
    vec![
        e.positives.to_string(),
        e.detected.to_string(),
        e.true_positive.to_string(),
        e.false_positive.to_string(),
        e.false_negative.to_string(),
        format!("{:.2}%", stats.recall * 100.0),
        format!("{:.2}%", stats.precision * 100.0),
        format!("{:.2}%", stats.f1 * 100.0),
    ]
}

/// Formats one row per run plus a total row, columns right-aligned.
pub fn format_aggregate_table(report: &AggregateReport) -> String {
    let rows: Vec<(String, Vec<String>)> = report
        .runs
        .iter()
        .map(|r| (r.name.clone(), aggregate_cells(&r.evaluation, r.video_duration())))
        .chain(std::iter::once((
            "Total".to_string(),
            aggregate_cells(&report.total, report.total_duration),
        )))
        .collect();

    let name_width = rows
        .iter()
        .map(|(name, _)| name.len())
        .chain(std::iter::once("Video".len()))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = AGGREGATE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, title)| {
            rows.iter()
                .map(|(_, cells)| cells[i].len())
                .chain(std::iter::once(title.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |name: &str, cells: &[String]| {
        let mut line = format!("{name:<name_width$}");
        for (cell, width) in cells.iter().zip(&widths) {
            line.push_str(&format!("  {cell:>width$}"));
        }
        line
    };

    let header: Vec<String> = AGGREGATE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut lines = vec![format_row("Video", &header)];
    lines.extend(rows.iter().map(|(name, cells)| format_row(name, cells)));
    lines.join("\n") + "\n"
}

/// Print the aggregate table, header and total rows emphasised.
pub fn print_aggregate_table(report: &AggregateReport) {
    let table = format_aggregate_table(report);
    let count = table.lines().count();
    for (i, line) in table.lines().enumerate() {
        if i == 0 || i + 1 == count {
            println!("{}", style(line).bold());
        } else {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventscore_core::{AnalysisRecord, EvaluationConfigBuilder};

    fn record(name: &str, tp: usize, fp: usize) -> AnalysisRecord {
        let evaluation = Evaluation {
            detected: tp + fp,
            positives: tp,
            true_positive: tp,
            false_positive: fp,
            ..Evaluation::default()
        };
        AnalysisRecord::new(name, evaluation, None, &EvaluationConfigBuilder::new().build())
    }

    #[test]
    fn test_format_aggregate_table() {
        let report = AggregateReport::from_records(vec![record("cam1", 1, 1), record("cam2", 3, 0)]);
        let table = format_aggregate_table(&report);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Video"));
        assert!(lines[1].starts_with("cam1"));
        assert!(lines[3].starts_with("Total"));
        assert!(lines[3].contains("80.00%"));
        // Columns line up
        let width = lines[0].len();
        assert!(lines.iter().all(|l| l.len() == width));
    }
}
