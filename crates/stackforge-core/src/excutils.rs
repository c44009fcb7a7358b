//! Helpers for deciding which errors a caller may swallow.

use crate::CoreError;
use std::fmt::Display;
use tracing::debug;

/// True for the error raised when another engine holds the stack lock.
pub fn is_action_in_progress(err: &CoreError) -> bool {
    matches!(err, CoreError::ActionInProgress { .. })
}

/// Swallows errors matching a predicate and propagates everything else.
///
/// `apply` turns an ignored error into `Ok(None)`, so the caller can tell a
/// filtered failure apart from success.
pub struct ErrorFilter<F> {
    ignore: F,
}

impl<F> ErrorFilter<F> {
    pub fn new(ignore: F) -> Self {
        Self { ignore }
    }

    pub fn apply<T, E>(&self, result: Result<T, E>) -> Result<Option<T>, E>
    where
        F: Fn(&E) -> bool,
        E: Display,
    {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if (self.ignore)(&e) => {
                debug!("ignoring filtered error: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl ErrorFilter<fn(&CoreError) -> bool> {
    pub fn action_in_progress() -> Self {
        Self::new(is_action_in_progress)
    }
}
