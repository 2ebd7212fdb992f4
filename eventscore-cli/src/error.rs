//! Error plumbing for the `eventscore` commands.
//!
//! Commands return [`CliResult`], which shares `CoreError` with the library so
//! that `main` has a single error type to print. Failures that need a
//! command-level explanation ("Analysis failed: ...") go through
//! [`CliErrorContext`] and end up as `CoreError::OperationFailed`.

use eventscore_core::{CoreError, CoreResult};
use std::fmt::Display;

pub type CliResult<T> = CoreResult<T>;

/// Prefixes a failing result with what the command was doing.
pub trait CliErrorContext<T> {
    fn cli_context(self, context: impl Display) -> CliResult<T>;

    /// Builds the prefix only when the result is an error.
    fn cli_with_context<C: Display>(self, context: impl FnOnce() -> C) -> CliResult<T>;
}

impl<T, E: Into<CoreError>> CliErrorContext<T> for Result<T, E> {
    fn cli_context(self, context: impl Display) -> CliResult<T> {
        self.cli_with_context(|| context)
    }

    fn cli_with_context<C: Display>(self, context: impl FnOnce() -> C) -> CliResult<T> {
        self.map_err(|e| {
            let cause: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {cause}", context()))
        })
    }
}

/// `CoreError::OperationFailed` with a formatted message.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        $crate::eventscore_core::CoreError::OperationFailed(format!($($arg)*))
    };
}
