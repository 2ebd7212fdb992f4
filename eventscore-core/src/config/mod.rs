//! Configuration structures and constants for the eventscore-core library.
//!
//! This module provides the evaluation configuration: which annotation labels
//! count as the evaluated event class, which are ambiguous, and the
//! [`MatchingPolicy`] that decides how far a detection may drift from its
//! ground-truth interval.
//!
//! Defaults can be overridden with `EVENTSCORE_*` environment variables and
//! whole configurations can be stored as JSON.

mod builder;
pub mod utils;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::annotations::LabelFilter;
use crate::error::{CoreError, CoreResult, io_error_at};
use crate::time::Timestamp;
use utils::{get_env_bool, get_env_f64, get_env_i64, get_env_parsed, get_env_string};

pub use builder::EvaluationConfigBuilder;

// Default constants

/// Default label of the evaluated event class.
pub const DEFAULT_EVENT_NAME: &str = "anor";

/// Default ambiguous label. Empty disables ambiguity detection.
pub const DEFAULT_AMBIGUOUS_NAME: &str = "";

/// Default delay (seconds) a detector is allowed after the truth ends.
pub const DEFAULT_DELAY_SECONDS: f64 = 0.0;

/// Default tolerance (seconds), e.g. the duration of a fall.
pub const DEFAULT_TOLERANCE_SECONDS: f64 = 3.0;

/// Upper bound for delay and tolerance (about 31,700 years), well inside the
/// millisecond range of [`Timestamp`].
pub const MAX_WINDOW_SECONDS: f64 = 1.0e12;

/// Which instant of a detection is compared against truth windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAnchor {
    /// The declared start of the detection.
    #[default]
    Begin,
    /// The midpoint of the detection span.
    Midpoint,
}

impl FromStr for EventAnchor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "begin" | "start" => Ok(EventAnchor::Begin),
            "midpoint" | "middle" => Ok(EventAnchor::Midpoint),
            other => Err(CoreError::Config(format!(
                "unknown event anchor '{other}', expected 'begin' or 'midpoint'"
            ))),
        }
    }
}

impl fmt::Display for EventAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventAnchor::Begin => write!(f, "begin"),
            EventAnchor::Midpoint => write!(f, "midpoint"),
        }
    }
}

/// Delay/tolerance policy used to build truth matching windows.
///
/// With `uncompromising = false` the window is
/// `[begin - tolerance, end + delay + tolerance]`. With
/// `uncompromising = true` early detections are rejected and the window
/// becomes `[begin + delay - tolerance, end + delay + tolerance]`.
///
/// Values are not validated here; see [`EvaluationConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingPolicy {
    pub delay_seconds: f64,
    pub tolerance_seconds: f64,
    pub uncompromising: bool,
    pub anchor: EventAnchor,
}

impl MatchingPolicy {
    #[must_use]
    pub fn new(delay_seconds: f64, tolerance_seconds: f64, uncompromising: bool) -> Self {
        Self {
            delay_seconds,
            tolerance_seconds,
            uncompromising,
            anchor: EventAnchor::Begin,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: EventAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn delay(&self) -> Timestamp {
        Timestamp::from_seconds(self.delay_seconds)
    }

    #[must_use]
    pub fn tolerance(&self) -> Timestamp {
        Timestamp::from_seconds(self.tolerance_seconds)
    }
}

impl Default for MatchingPolicy {
    fn default() -> Self {
        Self {
            delay_seconds: get_env_f64("EVENTSCORE_DELAY", DEFAULT_DELAY_SECONDS),
            tolerance_seconds: get_env_f64("EVENTSCORE_TOLERANCE", DEFAULT_TOLERANCE_SECONDS),
            uncompromising: get_env_bool("EVENTSCORE_UNCOMPROMISING", false),
            anchor: get_env_parsed("EVENTSCORE_ANCHOR", EventAnchor::Begin),
        }
    }
}

/// Reference instant subtracted from detection stamps.
///
/// Detector output may be stamped with wall-clock time rather than time since
/// the start of the video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartTimestamp {
    /// Use the `YYYYMMDD_HHMMSS_` prefix of the video file name, if any.
    #[default]
    FromVideoName,
    /// Fixed offset in milliseconds.
    Fixed(i64),
}

/// Main configuration structure for an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Substring identifying annotations of the evaluated event class
    pub event_name: String,

    /// Substring flagging annotations excluded from scoring
    pub ambiguous_name: String,

    /// Window derivation policy
    pub policy: MatchingPolicy,

    /// Offset subtracted from detection stamps
    pub start_timestamp: StartTimestamp,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        // A negative value keeps the file-name detection, as the CLI does
        let start_timestamp = match get_env_i64("EVENTSCORE_START_TIMESTAMP", -1) {
            ms if ms < 0 => StartTimestamp::FromVideoName,
            ms => StartTimestamp::Fixed(ms),
        };

        Self {
            event_name: get_env_string("EVENTSCORE_EVENT_NAME", DEFAULT_EVENT_NAME),
            ambiguous_name: get_env_string("EVENTSCORE_AMBIGUOUS_NAME", DEFAULT_AMBIGUOUS_NAME),
            policy: MatchingPolicy::default(),
            start_timestamp,
        }
    }
}

impl EvaluationConfig {
    /// Loads a JSON configuration file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| io_error_at(path, e))?;
        let config: EvaluationConfig = serde_json::from_str(&content)?;
        debug!("Loaded evaluation config from {}", path.display());
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error_at(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| io_error_at(path, e))?;
        Ok(())
    }

    /// Rejects settings that would make the windows meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if self.event_name.trim().is_empty() {
            return Err(CoreError::Config("event name must not be empty".to_string()));
        }
        for (name, value) in [
            ("delay", self.policy.delay_seconds),
            ("tolerance", self.policy.tolerance_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Config(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
            if value > MAX_WINDOW_SECONDS {
                return Err(CoreError::Config(format!(
                    "{name} must be at most {MAX_WINDOW_SECONDS} seconds, got {value}"
                )));
            }
        }
        if let StartTimestamp::Fixed(ms) = self.start_timestamp {
            if ms < 0 {
                return Err(CoreError::Config(format!(
                    "start timestamp must not be negative, got {ms}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn label_filter(&self) -> LabelFilter {
        LabelFilter::new(&self.event_name, &self.ambiguous_name)
    }
}
