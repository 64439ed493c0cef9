//! Terminal outcomes of a wait.

use crate::error::Result;
use crate::error::WaitError;
use crate::request::Timeout;

/// The single terminal outcome produced by every wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition held and the positive timeout elapsed without a veto.
    ConfirmedByTimeout,
    /// A human confirmed while the condition held.
    ConfirmedByUser,
    /// The negative timeout elapsed while the condition did not hold.
    FailedByTimeout,
    /// A human rejected the wait.
    FailedByUser,
}

impl WaitOutcome {
    /// Returns true for the two confirmed outcomes.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            WaitOutcome::ConfirmedByTimeout | WaitOutcome::ConfirmedByUser
        )
    }

    /// Maps the outcome to the caller-facing result: successes pass through,
    /// failures become the typed error carrying the expectation text.
    pub(crate) fn into_result(self, expectation: &str, negative_timeout: Timeout) -> Result<Self> {
        match self {
            WaitOutcome::ConfirmedByTimeout | WaitOutcome::ConfirmedByUser => Ok(self),
            WaitOutcome::FailedByTimeout => Err(WaitError::Timeout {
                expectation: expectation.to_string(),
                timeout: negative_timeout,
            }),
            WaitOutcome::FailedByUser => Err(WaitError::Aborted {
                expectation: expectation.to_string(),
            }),
        }
    }
}
