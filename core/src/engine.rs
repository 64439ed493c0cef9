//! Interactive wait engine: a timeout-governed state machine fed by the
//! evaluator loop, the timer loop, and asynchronous user acknowledgment
//! signals, all serialized through one critical section.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use condwait_protocol::WaitControl;
use condwait_protocol::WaitSurface;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::defaults;
use crate::error::Result;
use crate::error::WaitError;
use crate::evaluator;
use crate::outcome::WaitOutcome;
use crate::policy;
use crate::policy::Budget;
use crate::policy::EngineState;
use crate::request::Timeout;
use crate::request::WaitRequest;
use crate::timer;

/// Interactive waiter. Runs a wait with a presentation surface attached,
/// letting a human confirm or reject the outcome before it is finalized.
#[derive(Debug, Default)]
pub struct DialogWaiter;

impl DialogWaiter {
    /// Creates a new waiter.
    pub fn new() -> Self {
        Self
    }

    /// Blocks the caller until the wait reaches a terminal state.
    ///
    /// Spawns the evaluator and timer loops, attaches the surface, and
    /// applies every event under the engine's single critical section.
    /// Returns the confirmed outcome, or the typed failure for timeouts and
    /// user rejection.
    ///
    /// A wait may be started from within the user function of an outer wait;
    /// every call owns an independent engine, budgets, and loops.
    pub async fn run<T>(
        &self,
        request: WaitRequest<T>,
        surface: Arc<dyn WaitSurface>,
    ) -> Result<WaitOutcome>
    where
        T: PartialEq + fmt::Display + Default + Send + 'static,
    {
        if request.click_through && request.requires_interaction() {
            return Err(WaitError::UnsupportedRequest(
                "request has an action text but the surface is click-through; \
                 human interaction is not possible"
                    .to_string(),
            ));
        }

        let spec = request.surface_spec();
        let WaitRequest {
            function,
            predicate,
            expectation,
            negative_timeout,
            positive_timeout,
            polling_period,
            ..
        } = request;

        debug!(%expectation, "starting interactive wait");
        let engine = Arc::new(EngineShared::new(
            negative_timeout,
            positive_timeout,
            surface.clone(),
        ));
        surface.attach(&spec, engine.clone() as Arc<dyn WaitControl>);

        let timer_task = tokio::spawn(timer::run(engine.clone()));
        let eval_task = tokio::spawn(evaluator::run(
            engine.clone(),
            function,
            predicate,
            polling_period,
        ));

        let outcome = engine.wait_done().await;

        // Terminal entry already cancelled the token; the loops observe it
        // at their next suspension point.
        if timer_task.await.is_err() {
            warn!("timer loop panicked");
        }
        if eval_task.await.is_err() {
            warn!("evaluator loop panicked");
        }
        surface.close();

        outcome?.into_result(&expectation, negative_timeout)
    }
}

struct EngineCore {
    state: EngineState,
    good: Budget,
    bad: Budget,
}

/// State shared between the engine, its two loops, and the surface's
/// control handle. Non-generic: the value type stays inside the evaluator.
pub(crate) struct EngineShared {
    core: Mutex<EngineCore>,
    negative_timeout: Timeout,
    positive_timeout: Timeout,
    started_tx: watch::Sender<bool>,
    done_tx: watch::Sender<Option<WaitOutcome>>,
    cancel: CancellationToken,
    surface: Arc<dyn WaitSurface>,
}

impl EngineShared {
    fn new(
        negative_timeout: Timeout,
        positive_timeout: Timeout,
        surface: Arc<dyn WaitSurface>,
    ) -> Self {
        let (started_tx, _) = watch::channel(false);
        let (done_tx, _) = watch::channel(None);
        Self {
            core: Mutex::new(EngineCore {
                state: EngineState::Initializing,
                good: Budget::new(positive_timeout),
                bad: Budget::new(negative_timeout),
            }),
            negative_timeout,
            positive_timeout,
            started_tx,
            done_tx,
            cancel: CancellationToken::new(),
            surface,
        }
    }

    /// The single mutual-exclusion point. Lock poisoning is recovered: the
    /// state machine stays consistent because every mutation completes
    /// before any notification can panic a holder.
    fn core(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Sleeps for `duration`, waking early on cancellation. A zero duration
    /// yields once so tight polling loops stay cooperative.
    pub(crate) async fn sleep_cancellable(&self, duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(duration) => {}
        }
    }

    /// Resolves once the surface has completed setup and the engine has left
    /// `Initializing`. Events arriving earlier park here instead of failing.
    pub(crate) async fn wait_started(&self) {
        let mut rx = self.started_tx.subscribe();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                break;
            }
        }
    }

    async fn wait_done(&self) -> Result<WaitOutcome> {
        let mut rx = self.done_tx.subscribe();
        loop {
            let current = *rx.borrow();
            if let Some(outcome) = current {
                return Ok(outcome);
            }
            if rx.changed().await.is_err() {
                return Err(WaitError::InvalidState(
                    "engine dropped before reaching a terminal state".to_string(),
                ));
            }
        }
    }

    /// The evaluator observed a (possibly first) value. Advisory; forwarded
    /// to the surface while the wait is live.
    pub(crate) async fn value_changed(&self, display: String) {
        self.wait_started().await;
        let core = self.core();
        if core.state.is_terminal() {
            return;
        }
        self.surface.value_changed(&display);
    }

    /// The evaluator observed a truth flip. Applies the state transition and
    /// the budget-reset law, then notifies the surface in transition order.
    pub(crate) async fn truth_changed(&self, truth: bool) {
        self.wait_started().await;
        let mut core = self.core();
        if core.state.is_terminal() {
            return;
        }
        let next = policy::on_truth(core.state, truth, &mut core.good, self.positive_timeout);
        debug!(from = ?core.state, to = ?next, truth, "truth changed");
        core.state = next;
        self.surface.truth_changed(truth);
    }

    /// One timer tick: decrements the active budget and either finalizes the
    /// wait or forwards the countdown to the surface.
    pub(crate) fn timer_elapsed(&self) {
        let mut core = self.core();
        if core.state.is_terminal() || core.state == EngineState::Initializing {
            return;
        }
        let EngineCore { state, good, bad } = &mut *core;
        let next = policy::on_tick(*state, good, bad, defaults::TIMER_PERIOD);
        if next.is_terminal() {
            self.enter_terminal(&mut core, next);
        } else {
            self.surface
                .tick(core.good.remaining(), core.bad.remaining());
        }
    }

    fn enter_terminal(&self, core: &mut EngineCore, next: EngineState) {
        core.state = next;
        debug!(state = ?next, "wait reached terminal state");
        if let Some(outcome) = next.outcome() {
            // send_replace stores even with no receiver subscribed yet; a
            // surface may finalize the wait synchronously from attach,
            // before run subscribes.
            self.done_tx.send_replace(Some(outcome));
        }
        self.cancel.cancel();
    }
}

impl WaitControl for EngineShared {
    fn setup_complete(&self) {
        let mut core = self.core();
        if core.state != EngineState::Initializing {
            warn!(state = ?core.state, "duplicate setup_complete ignored");
            return;
        }
        core.state = EngineState::Undetermined;
        core.good.rearm(self.positive_timeout);
        core.bad.rearm(self.negative_timeout);
        self.surface
            .tick(core.good.remaining(), core.bad.remaining());
        // send_replace, not send: surfaces that complete setup synchronously
        // from attach run before the timer and evaluator subscribe, and a
        // plain send with no receiver would drop the value and park both
        // loops in wait_started forever.
        self.started_tx.send_replace(true);
    }

    fn confirm(&self) {
        let mut core = self.core();
        match policy::on_confirm(core.state, &core.good) {
            Some(next) => self.enter_terminal(&mut core, next),
            None => {
                if core.state == EngineState::ConditionFalse {
                    // Should be unreachable: surfaces disable the confirm
                    // control while the condition is false.
                    warn!("confirm ignored while condition is false");
                }
            }
        }
    }

    fn reject(&self) {
        let mut core = self.core();
        if let Some(next) = policy::on_reject(core.state, &core.bad) {
            self.enter_terminal(&mut core, next);
        }
    }
}

#[cfg(test)]
#[path = "engine.test.rs"]
mod tests;
