//! Timer loop: fixed-period ticks driving the countdown budgets.

use std::sync::Arc;

use crate::defaults;
use crate::engine::EngineShared;

/// Runs until cancelled. Ticking begins once the engine leaves
/// `Initializing`, with the first tick one full period after that point so
/// a budget is never charged for time that has not elapsed; every tick
/// applies the state-dependent budget decrement inside the engine's
/// critical section.
pub(crate) async fn run(engine: Arc<EngineShared>) {
    tokio::select! {
        _ = engine.cancelled() => return,
        _ = engine.wait_started() => {}
    }

    while !engine.is_cancelled() {
        engine.sleep_cancellable(defaults::TIMER_PERIOD).await;
        if engine.is_cancelled() {
            break;
        }
        engine.timer_elapsed();
    }
}
