use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn timeout_message_matches_countdown_format() {
    let err = WaitError::Timeout {
        expectation: "Order list is empty".to_string(),
        timeout: Timeout::Finite(Duration::from_secs(2)),
    };
    assert_eq!(
        err.to_string(),
        "Timeout of 2.00 seconds exceeded when waiting for 'Order list is empty'"
    );
}

#[test]
fn timeout_message_renders_fractional_seconds() {
    let err = WaitError::Timeout {
        expectation: "Door is closed".to_string(),
        timeout: Timeout::Finite(Duration::from_millis(1500)),
    };
    assert_eq!(
        err.to_string(),
        "Timeout of 1.50 seconds exceeded when waiting for 'Door is closed'"
    );
}

#[test]
fn aborted_message_carries_expectation() {
    let err = WaitError::Aborted {
        expectation: "Door is closed".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Wait for 'Door is closed' was aborted by the user"
    );
}
