//! Server error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Transport or event-loop failure, with the location it was raised at.
#[derive(Debug, Clone, Display, Error)]
#[display("Server error: {} at {}:{}", message, file, line)]
pub struct ServerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServerError {
    /// Creates a new server error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

/// A session state that breaks one of the seat/queue/count rules.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Session invariant violated: {}", message)]
pub struct InvariantViolation {
    /// Which rule broke, and how.
    pub message: String,
}

impl InvariantViolation {
    /// Creates a new violation report.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
