// eventscore-cli/src/lib.rs
//
// Library portion of the Eventscore CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-exported for the cli_error! macro
pub use eventscore_core;

// Re-export items needed by the binary or integration tests
pub use cli::{AggregateArgs, AnalyseArgs, BatchArgs, Cli, Commands, PolicyArgs};
pub use commands::aggregate::run_aggregate;
pub use commands::analyse::run_analyse;
pub use commands::batch::run_batch_command;
pub use error::{CliErrorContext, CliResult};

/// Installs logging and runs the parsed command.
pub fn run(cli: Cli) -> CliResult<()> {
    logging::init_logging(cli.verbose, cli.command.log_dir().as_deref());

    match cli.command {
        Commands::Analyse(args) => run_analyse(args),
        Commands::Batch(args) => run_batch_command(args),
        Commands::Aggregate(args) => run_aggregate(args),
    }
}
