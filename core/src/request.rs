//! Wait request model: what to evaluate, for how long, and how to present it.

use std::fmt;
use std::time::Duration;

use condwait_protocol::SurfaceSpec;

use crate::defaults;

/// A timeout budget: either a finite duration or the infinite sentinel.
///
/// An infinite budget is never decremented by the engine's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Never expires.
    Infinite,
    /// Expires once the duration has been consumed.
    Finite(Duration),
}

impl Timeout {
    /// A finite zero timeout.
    pub const ZERO: Timeout = Timeout::Finite(Duration::ZERO);

    /// Returns true for the infinite sentinel.
    pub fn is_infinite(&self) -> bool {
        matches!(self, Timeout::Infinite)
    }

    /// Returns true for a finite zero timeout.
    pub fn is_zero(&self) -> bool {
        matches!(self, Timeout::Finite(d) if d.is_zero())
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Timeout::Finite(d)
    }
}

impl fmt::Display for Timeout {
    /// Renders as seconds with two decimals, matching the countdown and
    /// error message format (`"2.00"`). The infinite sentinel renders as
    /// `"inf"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::Infinite => f.write_str("inf"),
            Timeout::Finite(d) => write!(f, "{:.2}", d.as_secs_f64()),
        }
    }
}

/// User function sampled by the evaluator loop.
pub type ValueFn<T> = Box<dyn Fn() -> T + Send>;

/// Predicate applied to the sampled value.
pub type PredicateFn<T> = Box<dyn Fn(&T) -> bool + Send>;

/// An immutable description of one wait.
///
/// Constructed per call through one of the shorthand constructors and the
/// builder-style setters; consumed by [`DialogWaiter::run`] or
/// [`SilentWaiter::run`].
///
/// [`DialogWaiter::run`]: crate::DialogWaiter::run
/// [`SilentWaiter::run`]: crate::SilentWaiter::run
pub struct WaitRequest<T> {
    pub(crate) function: Option<ValueFn<T>>,
    pub(crate) predicate: Option<PredicateFn<T>>,
    pub(crate) expectation: String,
    pub(crate) negative_timeout: Timeout,
    pub(crate) positive_timeout: Timeout,
    pub(crate) polling_period: Duration,
    pub(crate) click_through: bool,
    pub(crate) action_text: Option<String>,
}

impl<T> WaitRequest<T> {
    /// A wait on a value-producing function with an explicit predicate.
    ///
    /// Non-`bool` value types must always come through here: truthiness of
    /// an arbitrary value is not defined, so the predicate is required.
    pub fn value(
        function: impl Fn() -> T + Send + 'static,
        predicate: impl Fn(&T) -> bool + Send + 'static,
        expectation: impl Into<String>,
    ) -> Self {
        Self {
            function: Some(Box::new(function)),
            predicate: Some(Box::new(predicate)),
            expectation: expectation.into(),
            negative_timeout: Timeout::Finite(defaults::DEFAULT_NEGATIVE_TIMEOUT),
            positive_timeout: Timeout::Finite(defaults::DEFAULT_POSITIVE_TIMEOUT),
            polling_period: defaults::DEFAULT_POLLING_PERIOD,
            click_through: false,
            action_text: None,
        }
    }

    /// Sets the negative timeout: the time allowed while the condition is
    /// not satisfied.
    pub fn negative_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.negative_timeout = timeout.into();
        self
    }

    /// Sets the positive timeout: the grace period after the condition
    /// becomes satisfied, during which a human may still reject.
    pub fn positive_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.positive_timeout = timeout.into();
        self
    }

    /// Sets the interval between successive evaluations. A zero period means
    /// re-evaluate as fast as possible (the evaluator still yields between
    /// iterations).
    pub fn polling_period(mut self, period: Duration) -> Self {
        self.polling_period = period;
        self
    }

    /// Marks the presentation as passive: pointer events pass through and no
    /// confirm/reject controls are offered.
    pub fn click_through(mut self, click_through: bool) -> Self {
        self.click_through = click_through;
        self
    }

    /// Attaches an action text describing a manual step the user must
    /// perform, and widens the positive timeout to
    /// [`defaults::POSITIVE_TIMEOUT_WITH_ACTION`] if it was zero.
    ///
    /// A non-empty action text implies human interaction; headless waits
    /// reject such requests.
    pub fn action_text(mut self, text: impl Into<String>) -> Self {
        self.action_text = Some(text.into());
        if self.positive_timeout.is_zero() {
            self.positive_timeout = Timeout::Finite(defaults::POSITIVE_TIMEOUT_WITH_ACTION);
        }
        self
    }

    /// Derives the chrome descriptor the presentation surface receives.
    pub fn surface_spec(&self) -> SurfaceSpec {
        SurfaceSpec {
            show_bad_countdown: !self.negative_timeout.is_infinite(),
            show_good_countdown: !self.positive_timeout.is_infinite()
                && !self.positive_timeout.is_zero(),
            click_through: self.click_through,
            show_value: self.function.is_some(),
            action_text: self.action_text.clone(),
            expectation_lines: self.expectation.lines().count().max(1),
        }
    }

    pub(crate) fn requires_interaction(&self) -> bool {
        self.action_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl WaitRequest<bool> {
    /// A wait on a boolean condition. Shorthand for a function returning
    /// `bool` with the identity predicate.
    pub fn condition(
        function: impl Fn() -> bool + Send + 'static,
        expectation: impl Into<String>,
    ) -> Self {
        Self::value(function, |v| *v, expectation)
    }

    /// A wait on a predicate alone; the predicate is evaluated against the
    /// default value on every tick.
    pub fn predicate_only(
        predicate: impl Fn(&bool) -> bool + Send + 'static,
        expectation: impl Into<String>,
    ) -> Self {
        Self {
            function: None,
            predicate: Some(Box::new(predicate)),
            expectation: expectation.into(),
            negative_timeout: Timeout::Finite(defaults::DEFAULT_NEGATIVE_TIMEOUT),
            positive_timeout: Timeout::Finite(defaults::DEFAULT_POSITIVE_TIMEOUT),
            polling_period: defaults::DEFAULT_POLLING_PERIOD,
            click_through: false,
            action_text: None,
        }
    }

    /// A pure manual-acknowledgment wait: no function, no predicate, an
    /// infinite negative timeout. The wait ends only through the user.
    pub fn manual(action_text: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self {
            function: None,
            predicate: None,
            expectation: expectation.into(),
            negative_timeout: Timeout::Infinite,
            positive_timeout: Timeout::ZERO,
            polling_period: defaults::DEFAULT_POLLING_PERIOD,
            click_through: false,
            action_text: Some(action_text.into()),
        }
    }
}

impl<T> fmt::Debug for WaitRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitRequest")
            .field("function", &self.function.is_some())
            .field("predicate", &self.predicate.is_some())
            .field("expectation", &self.expectation)
            .field("negative_timeout", &self.negative_timeout)
            .field("positive_timeout", &self.positive_timeout)
            .field("polling_period", &self.polling_period)
            .field("click_through", &self.click_through)
            .field("action_text", &self.action_text)
            .finish()
    }
}

/// Change-detection adapter for value types without `PartialEq`: compares by
/// rendered display string instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByDisplay<T>(pub T);

impl<T: fmt::Display> PartialEq for ByDisplay<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_string() == other.0.to_string()
    }
}

impl<T: fmt::Display> fmt::Display for ByDisplay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[path = "request.test.rs"]
mod tests;
