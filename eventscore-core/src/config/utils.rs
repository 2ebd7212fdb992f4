//! Configuration utility functions
//!
//! This module provides helper functions for working with
//! environment variables and configuration values.

use std::str::FromStr;

/// Get a string value from an environment variable or use the default
pub fn get_env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a boolean value from an environment variable or use the default
pub fn get_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => val.to_lowercase() == "true" || val == "1",
        Err(_) => default,
    }
}

/// Get a f64 value from an environment variable or use the default
pub fn get_env_f64(key: &str, default: f64) -> f64 {
    get_env_parsed(key, default)
}

/// Get a i64 value from an environment variable or use the default
pub fn get_env_i64(key: &str, default: i64) -> i64 {
    get_env_parsed(key, default)
}

/// Get any `FromStr` value from an environment variable or use the default.
/// Unparseable values fall back to the default.
pub fn get_env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}
