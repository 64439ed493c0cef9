//! Engine-to-presentation contract for condition waits.
//!
//! The wait engine in `condwait-core` never draws anything. It talks to a
//! presentation surface (a dialog, a TUI panel, a test fake) exclusively
//! through the two traits in this crate:
//!
//! - [`WaitSurface`] is the engine → presentation half: advisory
//!   notifications about the observed value, the condition's truth, and the
//!   remaining countdown budgets, plus a final `close`.
//! - [`WaitControl`] is the presentation → engine half: the setup-complete
//!   signal and the two user acknowledgment signals (confirm / reject).
//!
//! A concrete UI crate depends only on this crate; it never needs the
//! engine's internals.

use std::sync::Arc;
use std::time::Duration;

/// Describes which pieces of chrome a presentation surface should show for
/// one wait request.
///
/// Derived from the request by the engine; purely advisory. A surface is free
/// to ignore any of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    /// Show the "abort in N seconds" countdown (negative timeout is finite).
    pub show_bad_countdown: bool,
    /// Show the "continue in N seconds" countdown (positive timeout is
    /// neither zero nor infinite).
    pub show_good_countdown: bool,
    /// Forward pointer events to whatever is underneath the surface instead
    /// of offering confirm/reject controls.
    pub click_through: bool,
    /// Show the currently observed value (a user function is configured).
    pub show_value: bool,
    /// Manual step the user is asked to perform, if any.
    pub action_text: Option<String>,
    /// Number of lines in the expectation text, for layout.
    pub expectation_lines: usize,
}

/// Presentation → engine signals.
///
/// Handed to the surface in [`WaitSurface::attach`]. All methods are
/// idempotent once the wait has reached a terminal state; late or duplicate
/// signals are ignored by the engine.
///
/// Methods must not be called reentrantly from inside a [`WaitSurface`]
/// notification: the engine delivers notifications from within its critical
/// section. Forward user input asynchronously (queue, channel, UI event
/// loop) instead.
pub trait WaitControl: Send + Sync {
    /// The surface finished initializing and display has begun. The engine
    /// arms its timeout budgets and starts ticking when this is called.
    fn setup_complete(&self);

    /// The user confirms the (currently satisfied) condition.
    fn confirm(&self);

    /// The user rejects the wait.
    fn reject(&self);
}

/// Engine → presentation notifications.
///
/// All methods are synchronous and must return promptly; they are invoked
/// from the engine's serialized transition path, so notification order
/// always matches the order in which changes were detected.
pub trait WaitSurface: Send + Sync {
    /// Called once before the wait begins. The surface keeps `control` and
    /// calls [`WaitControl::setup_complete`] when it is ready to display.
    fn attach(&self, spec: &SurfaceSpec, control: Arc<dyn WaitControl>);

    /// The observed value changed; `display` is its rendered form.
    fn value_changed(&self, display: &str);

    /// The condition's truth changed. Surfaces typically enable their
    /// confirm control iff `is_true`.
    fn truth_changed(&self, is_true: bool);

    /// Periodic countdown update. `None` means the budget is infinite.
    fn tick(&self, remaining_good: Option<Duration>, remaining_bad: Option<Duration>);

    /// The wait reached a terminal state. Invoked exactly once, after which
    /// no further notifications follow.
    fn close(&self);
}

/// A surface that renders nothing and completes setup immediately.
///
/// Useful for passive waits where the engine's timing semantics are wanted
/// without any visible chrome.
#[derive(Debug, Default)]
pub struct NullSurface;

impl WaitSurface for NullSurface {
    fn attach(&self, _spec: &SurfaceSpec, control: Arc<dyn WaitControl>) {
        control.setup_complete();
    }

    fn value_changed(&self, _display: &str) {}

    fn truth_changed(&self, _is_true: bool) {}

    fn tick(&self, _remaining_good: Option<Duration>, _remaining_bad: Option<Duration>) {}

    fn close(&self) {}
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
