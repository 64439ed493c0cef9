//! Headless waiter: polls inline with no presentation surface and no
//! concurrency. Only the negative timeout governs the wait.

use std::cmp;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::thread;
use std::time::Instant;

use tracing::debug;

use crate::defaults;
use crate::error::Result;
use crate::error::WaitError;
use crate::outcome::WaitOutcome;
use crate::request::PredicateFn;
use crate::request::Timeout;
use crate::request::ValueFn;
use crate::request::WaitRequest;

/// Non-interactive waiter. Runs the whole wait inline on the calling thread;
/// anything that would need a human is rejected up front.
#[derive(Debug, Default)]
pub struct SilentWaiter;

impl SilentWaiter {
    /// Creates a new waiter.
    pub fn new() -> Self {
        Self
    }

    /// Polls the condition until it holds or the negative timeout elapses.
    ///
    /// Blocking; safe to call from within the user function of an outer wait
    /// (nested waits share no state). Rejects requests that imply human
    /// interaction before any polling starts.
    pub fn run<T>(&self, request: WaitRequest<T>) -> Result<WaitOutcome>
    where
        T: PartialEq + fmt::Display + Default + Send + 'static,
    {
        if request.requires_interaction() {
            return Err(WaitError::UnsupportedRequest(
                "SilentWaiter does not support action text as it requires human interaction"
                    .to_string(),
            ));
        }
        // A zero positive timeout means continue immediately; an infinite
        // one never fires. Anything in between implies a confirmation step.
        if !request.positive_timeout.is_zero() && !request.positive_timeout.is_infinite() {
            return Err(WaitError::UnsupportedRequest(
                "SilentWaiter does not support positive timeout as it requires human interaction"
                    .to_string(),
            ));
        }
        if request.function.is_none()
            && request.predicate.is_none()
            && request.negative_timeout.is_infinite()
        {
            return Err(WaitError::UnsupportedRequest(
                "SilentWaiter does not support manual acknowledgment mode \
                 (no function or predicate with an infinite negative timeout)"
                    .to_string(),
            ));
        }
        // Nothing to evaluate: the condition trivially never becomes true,
        // so a finite negative timeout fails without waiting it out.
        if request.function.is_none() && request.predicate.is_none() {
            return Err(WaitError::Timeout {
                expectation: request.expectation,
                timeout: request.negative_timeout,
            });
        }

        let polling_period = if request.polling_period.is_zero() {
            defaults::DEFAULT_POLLING_PERIOD
        } else {
            request.polling_period
        };
        debug!(expectation = %request.expectation, "starting silent wait");

        let start = Instant::now();
        let mut value = T::default();
        loop {
            let deadline = match request.negative_timeout {
                Timeout::Infinite => None,
                Timeout::Finite(d) => Some(d),
            };
            if let Some(deadline) = deadline
                && start.elapsed() >= deadline
            {
                return Err(WaitError::Timeout {
                    expectation: request.expectation,
                    timeout: request.negative_timeout,
                });
            }

            if evaluate(&request.function, &request.predicate, &mut value) {
                return Ok(WaitOutcome::ConfirmedByTimeout);
            }

            // Infinite negative timeout means "must hold from the start":
            // the first false evaluation fails immediately, without retrying.
            let Some(deadline) = deadline else {
                return Err(WaitError::Timeout {
                    expectation: request.expectation,
                    timeout: Timeout::ZERO,
                });
            };

            let remaining = deadline.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(WaitError::Timeout {
                    expectation: request.expectation,
                    timeout: request.negative_timeout,
                });
            }
            thread::sleep(cmp::min(polling_period, remaining));
        }
    }
}

/// One polling attempt. A panicking function or predicate counts as
/// "condition not met" for this attempt.
fn evaluate<T>(
    function: &Option<ValueFn<T>>,
    predicate: &Option<PredicateFn<T>>,
    value: &mut T,
) -> bool
where
    T: PartialEq + fmt::Display + Default,
{
    if let Some(function) = function {
        match catch_unwind(AssertUnwindSafe(function.as_ref())) {
            Ok(observed) => *value = observed,
            Err(_) => {
                debug!("user function panicked; treating condition as not met");
                return false;
            }
        }
    }
    match predicate {
        Some(predicate) => catch_unwind(AssertUnwindSafe(|| predicate(value))).unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
#[path = "silent.test.rs"]
mod tests;
