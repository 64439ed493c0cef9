//! Evaluator loop: periodically samples the user function and predicate and
//! reports value/truth changes into the wait engine.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tracing::debug;
use tracing::trace;

use crate::engine::EngineShared;
use crate::request::PredicateFn;
use crate::request::ValueFn;

/// Runs until cancelled. With no predicate configured there is nothing to
/// evaluate: the loop idles so the wait is decided purely by the timer and
/// the user (manual-acknowledgment mode).
pub(crate) async fn run<T>(
    engine: Arc<EngineShared>,
    function: Option<ValueFn<T>>,
    predicate: Option<PredicateFn<T>>,
    polling_period: Duration,
) where
    T: PartialEq + fmt::Display + Default + Send + 'static,
{
    let Some(predicate) = predicate else {
        engine.cancelled().await;
        return;
    };

    let mut first = true;
    let mut value = T::default();
    let mut last_truth = false;

    while !engine.is_cancelled() {
        let iteration_start = Instant::now();

        let mut evaluation_failed = false;
        if let Some(function) = &function {
            match catch_unwind(AssertUnwindSafe(function.as_ref())) {
                Ok(observed) => {
                    let changed = first || observed != value;
                    value = observed;
                    if changed {
                        engine.value_changed(value.to_string()).await;
                    }
                }
                Err(_) => {
                    // A failing user function counts as "condition false"
                    // for this tick; it never aborts the wait early.
                    debug!("user function panicked; treating condition as false");
                    evaluation_failed = true;
                }
            }
        }

        let truth = if evaluation_failed {
            false
        } else {
            catch_unwind(AssertUnwindSafe(|| predicate(&value))).unwrap_or(false)
        };
        if first || truth != last_truth {
            trace!(truth, "condition truth changed");
            engine.truth_changed(truth).await;
            last_truth = truth;
        }
        first = false;

        // Sleep for whatever is left of the polling period after the time
        // spent evaluating; cancellation wakes the sleep early.
        let remaining = polling_period.saturating_sub(iteration_start.elapsed());
        engine.sleep_cancellable(remaining).await;
    }
}
