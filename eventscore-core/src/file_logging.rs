//! Console and file logging for runs that write an output directory.
//!
//! The console appender writes to stderr.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use crate::error::{CoreError, CoreResult};

const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";
const CONSOLE_PATTERN: &str = "{d(%H:%M:%S)} {h({l})} {m}{n}";

/// `<dir>/eventscore_<timestamp>.log`
pub fn log_file_path(dir: &Path, timestamp: &str) -> PathBuf {
    dir.join(format!("eventscore_{timestamp}.log"))
}

fn build_config(log_file: &Path, log_level: LevelFilter) -> Result<Config> {
    // Create log directory if it doesn't exist
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file)?;
    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;
    Ok(config)
}

/// Installs the global logger, writing to the console and to `log_file`.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> CoreResult<()> {
    let config = build_config(log_file, log_level)
        .map_err(|e| CoreError::Logging(format!("{}: {e}", log_file.display())))?;
    log4rs::init_config(config).map_err(|e| CoreError::Logging(e.to_string()))?;
    Ok(())
}
