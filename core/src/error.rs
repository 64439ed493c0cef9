//! Error types for condition waits.

use thiserror::Error;

use crate::request::Timeout;

/// Failure modes of a wait.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The negative timeout elapsed before the condition became (and stayed)
    /// true long enough to confirm.
    #[error("Timeout of {timeout} seconds exceeded when waiting for '{expectation}'")]
    Timeout {
        /// Human-readable description of the expected condition.
        expectation: String,
        /// The configured negative timeout.
        timeout: Timeout,
    },

    /// A human rejected the wait before it completed.
    #[error("Wait for '{expectation}' was aborted by the user")]
    Aborted {
        /// Human-readable description of the expected condition.
        expectation: String,
    },

    /// The request requires human interaction that the chosen variant
    /// cannot provide. Raised before any loop starts, never retried.
    #[error("{0}")]
    UnsupportedRequest(String),

    /// A transition was attempted from a state with no defined rule. This
    /// signals an implementation bug, not a runtime condition.
    #[error("Invalid engine state: {0}")]
    InvalidState(String),
}

/// Result type alias for wait operations.
pub type Result<T> = std::result::Result<T, WaitError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
