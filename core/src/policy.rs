//! Timeout policy: pure transition decisions over the engine state and the
//! two countdown budgets.
//!
//! Everything here is lock-free and loop-free so the state machine can be
//! exercised without spawning the evaluator or timer tasks. The engine owns
//! the mutable state and calls these functions from inside its critical
//! section.

use std::time::Duration;

use crate::outcome::WaitOutcome;
use crate::request::Timeout;

/// Lifecycle state of one wait.
///
/// Created `Initializing`, becomes `Undetermined` once the presentation
/// surface completes setup, oscillates between `ConditionTrue` and
/// `ConditionFalse` as the evaluator reports predicate changes, and finally
/// settles in one of the four terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The wait has started but the surface has not finished setup.
    Initializing,
    /// Setup is complete; no truth value observed yet.
    Undetermined,
    /// The condition currently holds.
    ConditionTrue,
    /// The condition currently does not hold.
    ConditionFalse,
    /// Terminal: the positive timeout elapsed while the condition held.
    SucceededTimedOut,
    /// Terminal: the user confirmed.
    SucceededUserConfirmed,
    /// Terminal: the negative timeout elapsed.
    FailedTimedOut,
    /// Terminal: the user rejected.
    FailedUserRejected,
}

impl EngineState {
    /// Returns true for the four terminal states.
    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    /// The outcome a terminal state maps to; `None` for live states.
    pub fn outcome(&self) -> Option<WaitOutcome> {
        match self {
            EngineState::SucceededTimedOut => Some(WaitOutcome::ConfirmedByTimeout),
            EngineState::SucceededUserConfirmed => Some(WaitOutcome::ConfirmedByUser),
            EngineState::FailedTimedOut => Some(WaitOutcome::FailedByTimeout),
            EngineState::FailedUserRejected => Some(WaitOutcome::FailedByUser),
            EngineState::Initializing
            | EngineState::Undetermined
            | EngineState::ConditionTrue
            | EngineState::ConditionFalse => None,
        }
    }
}

/// A countdown over a [`Timeout`]. The infinite sentinel never decrements
/// and never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    remaining: Timeout,
}

impl Budget {
    /// A budget armed with the given timeout.
    pub fn new(timeout: Timeout) -> Self {
        Self { remaining: timeout }
    }

    /// Re-arms the budget to the given timeout.
    pub fn rearm(&mut self, timeout: Timeout) {
        self.remaining = timeout;
    }

    /// Consumes one tick of the budget. No-op for infinite budgets.
    pub fn decrement(&mut self, period: Duration) {
        if let Timeout::Finite(d) = self.remaining {
            self.remaining = Timeout::Finite(d.saturating_sub(period));
        }
    }

    /// Returns true once a finite budget has been fully consumed.
    pub fn expired(&self) -> bool {
        matches!(self.remaining, Timeout::Finite(d) if d.is_zero())
    }

    /// Remaining time, or `None` for an infinite budget.
    pub fn remaining(&self) -> Option<Duration> {
        match self.remaining {
            Timeout::Infinite => None,
            Timeout::Finite(d) => Some(d),
        }
    }
}

/// Applies one timer tick: decrements whichever budget the current state
/// selects and decides whether a terminal transition fires.
///
/// Returns the next state; a non-terminal input state is returned unchanged
/// when the wait continues. Terminal states and `Initializing` are no-ops.
pub fn on_tick(
    state: EngineState,
    good: &mut Budget,
    bad: &mut Budget,
    period: Duration,
) -> EngineState {
    match state {
        EngineState::Undetermined | EngineState::ConditionFalse => {
            bad.decrement(period);
            if bad.expired() {
                EngineState::FailedTimedOut
            } else {
                state
            }
        }
        EngineState::ConditionTrue => {
            good.decrement(period);
            if good.expired() {
                EngineState::SucceededTimedOut
            } else {
                state
            }
        }
        _ => state,
    }
}

/// Applies an observed truth value.
///
/// The good budget is re-armed to the configured positive timeout only on a
/// false→true flip; re-entering the same truth never resets it. Terminal
/// states and `Initializing` are no-ops.
pub fn on_truth(
    state: EngineState,
    truth: bool,
    good: &mut Budget,
    positive_timeout: Timeout,
) -> EngineState {
    match state {
        EngineState::Undetermined | EngineState::ConditionTrue | EngineState::ConditionFalse => {
            let next = if truth {
                EngineState::ConditionTrue
            } else {
                EngineState::ConditionFalse
            };
            if state == EngineState::ConditionFalse && next == EngineState::ConditionTrue {
                good.rearm(positive_timeout);
            }
            next
        }
        _ => state,
    }
}

/// Applies a user confirmation. Valid from `Undetermined` and
/// `ConditionTrue`; the terminal variant records whether the good budget had
/// already run out. Returns `None` when the signal must be ignored.
pub fn on_confirm(state: EngineState, good: &Budget) -> Option<EngineState> {
    match state {
        EngineState::Undetermined | EngineState::ConditionTrue => Some(if good.expired() {
            EngineState::SucceededTimedOut
        } else {
            EngineState::SucceededUserConfirmed
        }),
        _ => None,
    }
}

/// Applies a user rejection. Valid from any live post-setup state; the
/// terminal variant records whether the bad budget had already run out.
/// Returns `None` when the signal must be ignored.
pub fn on_reject(state: EngineState, bad: &Budget) -> Option<EngineState> {
    match state {
        EngineState::Undetermined | EngineState::ConditionTrue | EngineState::ConditionFalse => {
            Some(if bad.expired() {
                EngineState::FailedTimedOut
            } else {
                EngineState::FailedUserRejected
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "policy.test.rs"]
mod tests;
