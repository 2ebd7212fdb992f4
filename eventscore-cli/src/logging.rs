// ============================================================================
// eventscore-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Logger initialization for the CLI
//
// Commands that write an output directory log to the console and to
// `<dir>/eventscore_<timestamp>.log` through log4rs (see
// eventscore_core::file_logging). Other commands log to the console only,
// through env_logger.
//
// USAGE:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug or --verbose: Detailed debugging information

use console::style;
use eventscore_core::file_logging::{log_file_path, setup_file_logging};
use log::{LevelFilter, debug, warn};
use std::io::Write;
use std::path::Path;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let name = format!("eventscore_{}.log", eventscore_cli::logging::get_timestamp());
/// assert_eq!(name.len(), "eventscore_20240601_123045.log".len());
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Console logger on stderr. `RUST_LOG` takes precedence over `verbose`.
pub fn init_console_logging(verbose: bool) {
    let result = env_logger::Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            };
            writeln!(buf, "{} {} {}", buf.timestamp(), level, record.args())
        })
        .filter_level(level_for(verbose))
        .parse_default_env()
        .try_init();

    if result.is_ok() {
        debug!("Logger initialized with level: {}", level_for(verbose));
    }
}

/// Installs the logger for a command. With a log directory the file logger
/// is tried first; the console logger is the fallback.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) {
    let Some(dir) = log_dir else {
        init_console_logging(verbose);
        return;
    };

    let log_file = log_file_path(dir, &get_timestamp());
    match setup_file_logging(&log_file, level_for(verbose)) {
        Ok(()) => debug!("Logging to {}", log_file.display()),
        Err(e) => {
            init_console_logging(verbose);
            warn!("File logging disabled: {e}");
        }
    }
}
