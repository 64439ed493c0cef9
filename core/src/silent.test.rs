use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use super::*;
use crate::request::WaitRequest;

const SHORT: Duration = Duration::from_millis(10);

#[test]
fn true_condition_succeeds_immediately() {
    let request = WaitRequest::condition(|| true, "Empty").polling_period(SHORT);
    let outcome = SilentWaiter::new().run(request);
    assert_matches!(outcome, Ok(WaitOutcome::ConfirmedByTimeout));
}

#[test]
fn repeated_waits_reuse_nothing() {
    let waiter = SilentWaiter::new();
    for _ in 0..50 {
        let request = WaitRequest::condition(|| true, "Empty").polling_period(SHORT);
        assert!(waiter.run(request).is_ok());
    }
}

#[test]
fn false_condition_times_out_within_one_polling_period() {
    let negative = Duration::from_millis(200);
    let request = WaitRequest::condition(|| false, "Order list is empty")
        .negative_timeout(negative)
        .polling_period(SHORT);

    let start = Instant::now();
    let err = SilentWaiter::new().run(request);
    let elapsed = start.elapsed();

    assert_matches!(err, Err(WaitError::Timeout { .. }));
    assert!(elapsed >= negative, "gave up too early: {elapsed:?}");
    // Upper bound: negative timeout + one polling period, with scheduling slack.
    assert!(
        elapsed < negative + SHORT + Duration::from_millis(100),
        "gave up too late: {elapsed:?}"
    );
}

#[test]
fn timeout_error_message_references_expectation_and_timeout() {
    let request = WaitRequest::condition(|| false, "Order list is empty")
        .negative_timeout(Duration::from_secs(1))
        .polling_period(Duration::from_millis(100));
    let err = SilentWaiter::new().run(request);
    assert_matches!(err, Err(e) => {
        assert_eq!(
            e.to_string(),
            "Timeout of 1.00 seconds exceeded when waiting for 'Order list is empty'"
        );
    });
}

#[test]
fn lazy_condition_eventually_satisfied() {
    let calls = AtomicU32::new(0);
    let request = WaitRequest::value(
        move || calls.fetch_add(1, Ordering::SeqCst),
        |count| *count >= 3,
        "Three polls happened",
    )
    .negative_timeout(Duration::from_secs(2))
    .polling_period(SHORT);

    assert_matches!(
        SilentWaiter::new().run(request),
        Ok(WaitOutcome::ConfirmedByTimeout)
    );
}

#[test]
fn action_text_is_rejected() {
    let request = WaitRequest::value(|| 1, |v| *v == 1, "value is 1").action_text("do something");
    let err = SilentWaiter::new().run(request);
    assert_matches!(err, Err(WaitError::UnsupportedRequest(message)) => {
        assert_eq!(
            message,
            "SilentWaiter does not support action text as it requires human interaction"
        );
    });
}

#[test]
fn interactive_positive_timeout_is_rejected() {
    // Zero and infinite positive timeouts need no human; anything else does.
    let request = WaitRequest::condition(|| true, "Empty")
        .positive_timeout(Duration::from_secs(1))
        .polling_period(SHORT);
    let err = SilentWaiter::new().run(request);
    assert_matches!(err, Err(WaitError::UnsupportedRequest(message)) => {
        assert_eq!(
            message,
            "SilentWaiter does not support positive timeout as it requires human interaction"
        );
    });

    let infinite = WaitRequest::condition(|| true, "Empty")
        .positive_timeout(Timeout::Infinite)
        .polling_period(SHORT);
    assert_matches!(
        SilentWaiter::new().run(infinite),
        Ok(WaitOutcome::ConfirmedByTimeout)
    );
}

#[test]
fn manual_acknowledgment_mode_is_rejected() {
    let request = WaitRequest::manual("press the button", "Button pressed");
    // Strip the action text to reach the manual-acknowledgment check itself.
    let request = WaitRequest::<bool> {
        action_text: None,
        ..request
    };
    assert_matches!(
        SilentWaiter::new().run(request),
        Err(WaitError::UnsupportedRequest(_))
    );
}

#[test]
fn nothing_to_evaluate_with_finite_timeout_fails_without_waiting() {
    let request = WaitRequest::<bool> {
        function: None,
        predicate: None,
        ..WaitRequest::condition(|| true, "Empty")
    }
    .negative_timeout(Duration::from_secs(30));

    let start = Instant::now();
    let err = SilentWaiter::new().run(request);
    assert_matches!(err, Err(WaitError::Timeout { .. }));
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn infinite_negative_timeout_fails_fast_on_first_false() {
    let request = WaitRequest::condition(|| false, "Empty")
        .negative_timeout(Timeout::Infinite)
        .polling_period(Duration::from_secs(10));

    let start = Instant::now();
    let err = SilentWaiter::new().run(request);
    let elapsed = start.elapsed();

    assert_matches!(err, Err(WaitError::Timeout { timeout, .. }) => {
        assert_eq!(timeout, Timeout::ZERO);
    });
    // No sleeping: the first false evaluation decides the wait.
    assert!(elapsed < Duration::from_millis(50), "slept: {elapsed:?}");
}

#[test]
fn panicking_function_is_treated_as_condition_false() {
    let request = WaitRequest::condition(|| panic!("boom"), "Never evaluates")
        .negative_timeout(Duration::from_millis(100))
        .polling_period(SHORT);
    assert_matches!(
        SilentWaiter::new().run(request),
        Err(WaitError::Timeout { .. })
    );
}

#[test]
fn panicking_function_recovers_when_it_stops_failing() {
    let calls = AtomicU32::new(0);
    let request = WaitRequest::condition(
        move || {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                panic!("transient failure");
            }
            true
        },
        "Recovers after two failures",
    )
    .negative_timeout(Duration::from_secs(2))
    .polling_period(SHORT);

    assert_matches!(
        SilentWaiter::new().run(request),
        Ok(WaitOutcome::ConfirmedByTimeout)
    );
}

#[test]
fn zero_polling_period_defaults_instead_of_spinning() {
    let request = WaitRequest::condition(|| false, "Empty")
        .negative_timeout(Duration::from_millis(150))
        .polling_period(Duration::ZERO);
    assert_matches!(
        SilentWaiter::new().run(request),
        Err(WaitError::Timeout { .. })
    );
}

#[test]
fn nested_silent_waits_are_independent() {
    let request = WaitRequest::condition(
        || {
            let inner = WaitRequest::condition(|| true, "sub wait")
                .negative_timeout(Duration::from_secs(2))
                .polling_period(SHORT);
            SilentWaiter::new().run(inner).is_ok()
        },
        "main wait",
    )
    .negative_timeout(Duration::from_secs(5))
    .polling_period(SHORT);

    assert_matches!(
        SilentWaiter::new().run(request),
        Ok(WaitOutcome::ConfirmedByTimeout)
    );
}
