// ============================================================================
// eventscore-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for EvaluationConfig
//
// Fluent construction of EvaluationConfig values. The builder starts from the
// compile-time defaults (never the environment), which keeps programmatic
// callers and tests independent of EVENTSCORE_* variables.

use super::{
    DEFAULT_AMBIGUOUS_NAME, DEFAULT_DELAY_SECONDS, DEFAULT_EVENT_NAME, DEFAULT_TOLERANCE_SECONDS,
    EvaluationConfig, EventAnchor, MatchingPolicy, StartTimestamp,
};

/// Builder for creating EvaluationConfig instances.
///
/// # Examples
///
/// ```rust
/// use eventscore_core::config::{EvaluationConfigBuilder, EventAnchor};
///
/// let config = EvaluationConfigBuilder::new()
///     .event_name("intrusion")
///     .ambiguous_name("ambiguous")
///     .delay_seconds(5.0)
///     .tolerance_seconds(1.0)
///     .uncompromising(true)
///     .anchor(EventAnchor::Midpoint)
///     .build();
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EvaluationConfigBuilder {
    event_name: String,
    ambiguous_name: String,
    policy: MatchingPolicy,
    start_timestamp: StartTimestamp,
}

impl Default for EvaluationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationConfigBuilder {
    /// Creates a new builder with the compile-time defaults.
    pub fn new() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
            ambiguous_name: DEFAULT_AMBIGUOUS_NAME.to_string(),
            policy: MatchingPolicy {
                delay_seconds: DEFAULT_DELAY_SECONDS,
                tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
                uncompromising: false,
                anchor: EventAnchor::Begin,
            },
            start_timestamp: StartTimestamp::FromVideoName,
        }
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: EvaluationConfig) -> Self {
        Self {
            event_name: config.event_name,
            ambiguous_name: config.ambiguous_name,
            policy: config.policy,
            start_timestamp: config.start_timestamp,
        }
    }

    /// Sets the label of the evaluated event class.
    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    /// Sets the label marking ambiguous annotations.
    pub fn ambiguous_name(mut self, name: impl Into<String>) -> Self {
        self.ambiguous_name = name.into();
        self
    }

    pub fn delay_seconds(mut self, seconds: f64) -> Self {
        self.policy.delay_seconds = seconds;
        self
    }

    pub fn tolerance_seconds(mut self, seconds: f64) -> Self {
        self.policy.tolerance_seconds = seconds;
        self
    }

    /// Rejects detections that arrive before `delay - tolerance`.
    pub fn uncompromising(mut self, enabled: bool) -> Self {
        self.policy.uncompromising = enabled;
        self
    }

    pub fn anchor(mut self, anchor: EventAnchor) -> Self {
        self.policy.anchor = anchor;
        self
    }

    pub fn start_timestamp(mut self, start: StartTimestamp) -> Self {
        self.start_timestamp = start;
        self
    }

    /// Builds the configuration. Call [`EvaluationConfig::validate`] before use.
    pub fn build(self) -> EvaluationConfig {
        EvaluationConfig {
            event_name: self.event_name,
            ambiguous_name: self.ambiguous_name,
            policy: self.policy,
            start_timestamp: self.start_timestamp,
        }
    }
}
