//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Scores one event file against one ground truth.
pub mod analyse;

/// Aggregates the analyses of a run directory.
pub mod aggregate;

/// Analyses every video of a run directory.
pub mod batch;

use crate::cli::PolicyArgs;
use crate::error::{CliErrorContext, CliResult};
use eventscore_core::{EvaluationConfig, EvaluationConfigBuilder, StartTimestamp};
use log::debug;

/// Builds the evaluation configuration: file (or environment defaults),
/// then command-line overrides.
pub fn resolve_config(args: &PolicyArgs) -> CliResult<EvaluationConfig> {
    let base = match &args.config {
        Some(path) => EvaluationConfig::from_file(path)
            .cli_with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => EvaluationConfig::default(),
    };

    let mut builder = EvaluationConfigBuilder::from_config(base);
    if let Some(name) = &args.event_name {
        builder = builder.event_name(name.as_str());
    }
    if let Some(name) = &args.ambiguous_name {
        builder = builder.ambiguous_name(name.as_str());
    }
    if let Some(delay) = args.delay {
        builder = builder.delay_seconds(delay);
    }
    if let Some(tolerance) = args.tolerance {
        builder = builder.tolerance_seconds(tolerance);
    }
    if args.uncompromising {
        builder = builder.uncompromising(true);
    }
    if let Some(anchor) = args.anchor {
        builder = builder.anchor(anchor);
    }
    if let Some(ms) = args.start_timestamp {
        builder = builder.start_timestamp(if ms < 0 {
            StartTimestamp::FromVideoName
        } else {
            StartTimestamp::Fixed(ms)
        });
    }

    let config = builder.build();
    config.validate()?;
    debug!("Evaluation configuration: {config:?}");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventscore_core::{CoreError, EventAnchor};
    use std::fs;

    #[test]
    fn test_flags_override_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"event_name": "fall", "policy": {"delay_seconds": 2.0, "tolerance_seconds": 4.0}}"#,
        )
        .unwrap();

        let args = PolicyArgs {
            tolerance: Some(1.0),
            anchor: Some(EventAnchor::Midpoint),
            start_timestamp: Some(250),
            config: Some(path),
            ..PolicyArgs::default()
        };
        let config = resolve_config(&args).unwrap();

        assert_eq!(config.event_name, "fall");
        assert_eq!(config.policy.delay_seconds, 2.0);
        assert_eq!(config.policy.tolerance_seconds, 1.0);
        assert_eq!(config.policy.anchor, EventAnchor::Midpoint);
        assert_eq!(config.start_timestamp, StartTimestamp::Fixed(250));
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let args = PolicyArgs {
            delay: Some(-1.0),
            ..PolicyArgs::default()
        };
        assert!(matches!(resolve_config(&args), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let args = PolicyArgs {
            config: Some("/no/such/config.json".into()),
            ..PolicyArgs::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }
}
