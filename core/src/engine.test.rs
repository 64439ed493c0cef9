#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use assert_matches::assert_matches;
use condwait_protocol::NullSurface;
use condwait_protocol::SurfaceSpec;
use condwait_protocol::WaitControl;
use condwait_protocol::WaitSurface;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use super::*;
use crate::request::WaitRequest;

const POLL: Duration = Duration::from_millis(10);

/// Event forwarded out of the fake surface so tests can drive the
/// acknowledgment channel from outside the engine's critical section.
#[derive(Debug, Clone, PartialEq)]
enum SurfaceEvent {
    Truth(bool),
    Value(String),
}

/// Recording surface. Completes setup on attach and forwards every
/// notification into an unbounded channel; user signals are sent through
/// the stored control handle by the test itself, never reentrantly.
struct TestSurface {
    control: Mutex<Option<Arc<dyn WaitControl>>>,
    spec: Mutex<Option<SurfaceSpec>>,
    events: mpsc::UnboundedSender<SurfaceEvent>,
    values: Mutex<Vec<String>>,
    truths: Mutex<Vec<bool>>,
    ticks: AtomicUsize,
    closes: AtomicUsize,
}

impl TestSurface {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SurfaceEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let surface = Arc::new(Self {
            control: Mutex::new(None),
            spec: Mutex::new(None),
            events,
            values: Mutex::new(Vec::new()),
            truths: Mutex::new(Vec::new()),
            ticks: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        });
        (surface, rx)
    }

    fn control(&self) -> Arc<dyn WaitControl> {
        self.control.lock().unwrap().clone().unwrap()
    }
}

impl WaitSurface for TestSurface {
    fn attach(&self, spec: &SurfaceSpec, control: Arc<dyn WaitControl>) {
        *self.spec.lock().unwrap() = Some(spec.clone());
        *self.control.lock().unwrap() = Some(control.clone());
        control.setup_complete();
    }

    fn value_changed(&self, display: &str) {
        self.values.lock().unwrap().push(display.to_string());
        let _ = self.events.send(SurfaceEvent::Value(display.to_string()));
    }

    fn truth_changed(&self, is_true: bool) {
        self.truths.lock().unwrap().push(is_true);
        let _ = self.events.send(SurfaceEvent::Truth(is_true));
    }

    fn tick(&self, _remaining_good: Option<Duration>, _remaining_bad: Option<Duration>) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

async fn next_truth(rx: &mut mpsc::UnboundedReceiver<SurfaceEvent>, expected: bool) {
    loop {
        match rx.recv().await.unwrap() {
            SurfaceEvent::Truth(t) if t == expected => return,
            _ => {}
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn true_condition_with_zero_positive_timeout_confirms_quickly() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(|| true, "Empty")
        .negative_timeout(Duration::from_secs(2))
        .polling_period(POLL);

    let start = Instant::now();
    let outcome = DialogWaiter::new().run(request, surface.clone()).await;

    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByTimeout));
    // One timer tick after the truth flip is all it takes.
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn setup_completed_synchronously_from_attach_is_not_lost() {
    // NullSurface calls setup_complete from inside attach, before the timer
    // and evaluator tasks exist; the started signal must still reach them
    // once they subscribe, or the wait would never tick.
    let request = WaitRequest::condition(|| true, "Empty")
        .negative_timeout(Duration::from_secs(2))
        .polling_period(POLL);

    let outcome = DialogWaiter::new()
        .run(request, Arc::new(NullSurface))
        .await;
    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByTimeout));
}

#[tokio::test(flavor = "multi_thread")]
async fn false_condition_fails_with_timeout_message() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(|| false, "Order list is empty")
        .negative_timeout(Duration::from_secs(1))
        .positive_timeout(Duration::from_secs(1))
        .polling_period(Duration::from_millis(100));

    let start = Instant::now();
    let err = DialogWaiter::new().run(request, surface.clone()).await;
    let elapsed = start.elapsed();

    assert_matches!(err, Err(e) => {
        assert_eq!(
            e.to_string(),
            "Timeout of 1.00 seconds exceeded when waiting for 'Order list is empty'"
        );
    });
    // The first tick fires a full timer period after setup, so the wall
    // clock can never undercut the configured negative timeout.
    assert!(elapsed >= Duration::from_secs(1), "failed early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "failed late: {elapsed:?}");
    assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn user_confirm_finishes_the_wait() {
    let (surface, mut rx) = TestSurface::new();
    let request = WaitRequest::condition(|| true, "Empty")
        .negative_timeout(Duration::from_secs(5))
        .positive_timeout(Duration::from_secs(5))
        .polling_period(POLL);

    let waiter = DialogWaiter::new();
    let run = waiter.run(request, surface.clone());
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = next_truth(&mut rx, true) => {
            surface.control().confirm();
            run.await
        }
    };

    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByUser));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_reject_fails_the_wait() {
    let (surface, mut rx) = TestSurface::new();
    let request = WaitRequest::condition(|| false, "Door is closed")
        .negative_timeout(Duration::from_secs(5))
        .polling_period(POLL);

    let waiter = DialogWaiter::new();
    let run = waiter.run(request, surface.clone());
    tokio::pin!(run);

    let err = tokio::select! {
        outcome = &mut run => outcome,
        _ = next_truth(&mut rx, false) => {
            surface.control().reject();
            run.await
        }
    };

    assert_matches!(err, Err(WaitError::Aborted { expectation }) => {
        assert_eq!(expectation, "Door is closed");
    });
}

#[tokio::test(flavor = "multi_thread")]
async fn signals_after_terminal_state_are_ignored() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(|| true, "Empty")
        .negative_timeout(Duration::from_secs(2))
        .polling_period(POLL);

    let outcome = DialogWaiter::new().run(request, surface.clone()).await;
    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByTimeout));

    // The surface still holds a control handle; late clicks are no-ops.
    let control = surface.control();
    control.confirm();
    control.reject();
    control.setup_complete();
    assert_eq!(surface.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn value_changes_are_reported_in_detection_order() {
    let (surface, _rx) = TestSurface::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let request = WaitRequest::value(
        move || counter.fetch_add(1, Ordering::SeqCst),
        |count| *count >= 3,
        "Counter reached three",
    )
    .negative_timeout(Duration::from_secs(5))
    .polling_period(POLL);

    let outcome = DialogWaiter::new().run(request, surface.clone()).await;
    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByTimeout));

    let values = surface.values.lock().unwrap().clone();
    assert!(values.len() >= 4, "expected at least four samples: {values:?}");
    assert_eq!(values[..4], ["0", "1", "2", "3"]);

    // Truth goes false on the first sample and true exactly once at the end.
    let truths = surface.truths.lock().unwrap().clone();
    assert_eq!(truths.first(), Some(&false));
    assert_eq!(truths.last(), Some(&true));
    assert_eq!(truths.iter().filter(|t| **t).count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn flipping_condition_exhausts_the_negative_timeout() {
    let (surface, _rx) = TestSurface::new();
    let flips = Arc::new(AtomicUsize::new(0));
    let request = WaitRequest::condition(
        move || flips.fetch_add(1, Ordering::SeqCst) % 2 == 1,
        "Flips",
    )
    .negative_timeout(Duration::from_secs(2))
    .positive_timeout(Duration::from_secs(1))
    .polling_period(Duration::from_millis(500));

    // The positive budget keeps re-arming on every false->true flip, so it
    // can never expire; the negative budget eventually runs out.
    let err = DialogWaiter::new().run(request, surface).await;
    assert_matches!(err, Err(WaitError::Timeout { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn manual_wait_idles_until_rejected() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::manual("press the reset button", "Controller rebooted");

    let waiter = DialogWaiter::new();
    let run = waiter.run(request, surface.clone());
    tokio::pin!(run);

    // No predicate: the evaluator idles and no truth event ever arrives,
    // so the sleep branch always wins the race.
    let err = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::time::sleep(Duration::from_millis(300)) => {
            surface.control().reject();
            run.await
        }
    };
    assert_matches!(err, Err(WaitError::Aborted { .. }));
    // The evaluator never produced value or truth notifications.
    assert!(surface.values.lock().unwrap().is_empty());
    assert!(surface.truths.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn manual_wait_confirms_from_undetermined() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::manual("flip the breaker", "Power restored")
        .positive_timeout(Timeout::Infinite);

    let waiter = DialogWaiter::new();
    let run = waiter.run(request, surface.clone());
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::time::sleep(Duration::from_millis(100)) => {
            surface.control().confirm();
            run.await
        }
    };
    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByUser));
}

#[tokio::test(flavor = "multi_thread")]
async fn no_predicate_with_finite_timeout_times_out() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::<bool> {
        function: None,
        predicate: None,
        ..WaitRequest::condition(|| true, "Empty")
    }
    .negative_timeout(Duration::from_millis(300))
    .polling_period(POLL);

    let err = DialogWaiter::new().run(request, surface).await;
    assert_matches!(err, Err(WaitError::Timeout { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn click_through_with_action_text_is_unsupported() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(|| true, "Empty")
        .click_through(true)
        .action_text("press the green button");

    let err = DialogWaiter::new().run(request, surface.clone()).await;
    assert_matches!(err, Err(WaitError::UnsupportedRequest(_)));
    // Rejected before any loop started: the surface was never attached.
    assert!(surface.control.lock().unwrap().is_none());
    assert_eq!(surface.closes.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_function_times_out_instead_of_propagating() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(|| panic!("boom"), "Never evaluates")
        .negative_timeout(Duration::from_millis(300))
        .polling_period(POLL);

    let err = DialogWaiter::new().run(request, surface).await;
    assert_matches!(err, Err(WaitError::Timeout { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn budget_reset_law_keeps_slow_flipper_alive_past_positive_timeout() {
    let (surface, _rx) = TestSurface::new();
    let flips = Arc::new(AtomicUsize::new(0));
    // true, false, true, false... every 200ms; positive timeout 500ms can
    // never fully elapse inside one true-phase, so the wait only ends when
    // the negative budget (drained during the false phases) runs out.
    let request = WaitRequest::condition(
        move || flips.fetch_add(1, Ordering::SeqCst) % 2 == 0,
        "Flips",
    )
    .negative_timeout(Duration::from_millis(800))
    .positive_timeout(Duration::from_millis(500))
    .polling_period(Duration::from_millis(200));

    let start = Instant::now();
    let err = DialogWaiter::new().run(request, surface).await;
    assert_matches!(err, Err(WaitError::Timeout { .. }));
    // Far longer than the positive timeout alone would have allowed.
    assert!(start.elapsed() >= Duration::from_millis(800));
}

#[tokio::test(flavor = "multi_thread")]
async fn surface_receives_derived_spec() {
    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(|| true, "Empty")
        .negative_timeout(Timeout::Infinite)
        .positive_timeout(Duration::from_secs(1))
        .polling_period(POLL);

    let waiter = DialogWaiter::new();
    let run = waiter.run(request, surface.clone());
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::time::sleep(Duration::from_millis(200)) => {
            surface.control().confirm();
            run.await
        }
    };
    outcome.unwrap();

    let spec = surface.spec.lock().unwrap().clone().unwrap();
    assert!(!spec.show_bad_countdown);
    assert!(spec.show_good_countdown);
    assert!(spec.show_value);
    assert!(surface.ticks.load(Ordering::SeqCst) >= 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn nested_silent_wait_inside_dialog_wait() {
    use crate::silent::SilentWaiter;

    let (surface, _rx) = TestSurface::new();
    let request = WaitRequest::condition(
        || {
            let inner = WaitRequest::condition(|| true, "sub wait")
                .negative_timeout(Duration::from_secs(2))
                .polling_period(Duration::from_millis(10));
            SilentWaiter::new().run(inner).is_ok()
        },
        "main wait",
    )
    .negative_timeout(Duration::from_secs(5))
    .polling_period(Duration::from_millis(100));

    let outcome = DialogWaiter::new().run(request, surface).await;
    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByTimeout));
}
