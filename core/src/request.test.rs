use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn timeout_displays_seconds_with_two_decimals() {
    assert_eq!(Timeout::Finite(Duration::from_secs(2)).to_string(), "2.00");
    assert_eq!(
        Timeout::Finite(Duration::from_millis(100)).to_string(),
        "0.10"
    );
    assert_eq!(Timeout::ZERO.to_string(), "0.00");
    assert_eq!(Timeout::Infinite.to_string(), "inf");
}

#[test]
fn condition_constructor_applies_defaults() {
    let request = WaitRequest::condition(|| true, "Empty");
    assert_eq!(
        request.negative_timeout,
        Timeout::Finite(defaults::DEFAULT_NEGATIVE_TIMEOUT)
    );
    assert_eq!(request.positive_timeout, Timeout::ZERO);
    assert_eq!(request.polling_period, defaults::DEFAULT_POLLING_PERIOD);
    assert!(!request.click_through);
    assert!(request.action_text.is_none());
}

#[test]
fn manual_constructor_requires_user_to_finish() {
    let request = WaitRequest::manual("press the reset button", "Controller rebooted");
    assert!(request.function.is_none());
    assert!(request.predicate.is_none());
    assert_eq!(request.negative_timeout, Timeout::Infinite);
    assert_eq!(request.positive_timeout, Timeout::ZERO);
    assert!(request.requires_interaction());
}

#[test]
fn action_text_widens_zero_positive_timeout() {
    let request = WaitRequest::condition(|| true, "Empty").action_text("flip the switch");
    assert_eq!(
        request.positive_timeout,
        Timeout::Finite(defaults::POSITIVE_TIMEOUT_WITH_ACTION)
    );

    let explicit = WaitRequest::condition(|| true, "Empty")
        .positive_timeout(Duration::from_secs(5))
        .action_text("flip the switch");
    assert_eq!(
        explicit.positive_timeout,
        Timeout::Finite(Duration::from_secs(5))
    );
}

#[test]
fn surface_spec_reflects_request_shape() {
    let spec = WaitRequest::value(|| 3, |v| *v > 2, "Counter is high")
        .negative_timeout(Timeout::Infinite)
        .positive_timeout(Duration::from_secs(1))
        .surface_spec();
    assert!(!spec.show_bad_countdown);
    assert!(spec.show_good_countdown);
    assert!(spec.show_value);
    assert_eq!(spec.expectation_lines, 1);

    let spec = WaitRequest::predicate_only(|_| false, "line one\nline two").surface_spec();
    assert!(spec.show_bad_countdown);
    // Zero positive timeout: nothing to count down after the flip.
    assert!(!spec.show_good_countdown);
    assert!(!spec.show_value);
    assert_eq!(spec.expectation_lines, 2);
}

#[test]
fn by_display_compares_rendered_strings() {
    #[derive(Debug, Default, Clone, Copy)]
    struct NoEq(u32);

    impl std::fmt::Display for NoEq {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "#{}", self.0)
        }
    }

    assert_eq!(ByDisplay(NoEq(1)), ByDisplay(NoEq(1)));
    assert_ne!(ByDisplay(NoEq(1)), ByDisplay(NoEq(2)));
    assert_eq!(ByDisplay(NoEq(7)).to_string(), "#7");
}
