// eventscore-cli/src/main.rs
//
// Entry point of the `eventscore` binary: parses the command line, runs the
// selected command and maps failures to a red message on stderr and exit
// code 1.

use clap::Parser;
use console::style;
use eventscore_cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = eventscore_cli::run(cli) {
        eprintln!("{}", style(format!("Error: {e}")).red().bold());
        process::exit(1);
    }
}
