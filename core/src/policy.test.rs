use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

const PERIOD: Duration = Duration::from_millis(100);

fn budgets(good: Timeout, bad: Timeout) -> (Budget, Budget) {
    (Budget::new(good), Budget::new(bad))
}

#[test]
fn infinite_budget_never_decrements_or_expires() {
    let mut budget = Budget::new(Timeout::Infinite);
    for _ in 0..1000 {
        budget.decrement(PERIOD);
    }
    assert!(!budget.expired());
    assert_eq!(budget.remaining(), None);
}

#[test]
fn finite_budget_saturates_at_zero() {
    let mut budget = Budget::new(Timeout::Finite(Duration::from_millis(150)));
    budget.decrement(PERIOD);
    assert_eq!(budget.remaining(), Some(Duration::from_millis(50)));
    assert!(!budget.expired());
    budget.decrement(PERIOD);
    assert!(budget.expired());
    budget.decrement(PERIOD);
    assert_eq!(budget.remaining(), Some(Duration::ZERO));
}

#[test]
fn tick_decrements_bad_budget_while_undetermined_or_false() {
    for state in [EngineState::Undetermined, EngineState::ConditionFalse] {
        let (mut good, mut bad) = budgets(
            Timeout::Finite(Duration::from_secs(1)),
            Timeout::Finite(Duration::from_secs(1)),
        );
        let next = on_tick(state, &mut good, &mut bad, PERIOD);
        assert_eq!(next, state);
        assert_eq!(bad.remaining(), Some(Duration::from_millis(900)));
        assert_eq!(good.remaining(), Some(Duration::from_secs(1)));
    }
}

#[test]
fn tick_decrements_good_budget_while_true() {
    let (mut good, mut bad) = budgets(
        Timeout::Finite(Duration::from_secs(1)),
        Timeout::Finite(Duration::from_secs(1)),
    );
    let next = on_tick(EngineState::ConditionTrue, &mut good, &mut bad, PERIOD);
    assert_eq!(next, EngineState::ConditionTrue);
    assert_eq!(good.remaining(), Some(Duration::from_millis(900)));
    assert_eq!(bad.remaining(), Some(Duration::from_secs(1)));
}

#[test]
fn bad_budget_expiry_fails_the_wait() {
    let (mut good, mut bad) = budgets(Timeout::Infinite, Timeout::Finite(PERIOD));
    let next = on_tick(EngineState::ConditionFalse, &mut good, &mut bad, PERIOD);
    assert_eq!(next, EngineState::FailedTimedOut);
}

#[test]
fn good_budget_expiry_confirms_the_wait() {
    let (mut good, mut bad) = budgets(Timeout::Finite(PERIOD), Timeout::Infinite);
    let next = on_tick(EngineState::ConditionTrue, &mut good, &mut bad, PERIOD);
    assert_eq!(next, EngineState::SucceededTimedOut);
}

#[test]
fn tick_is_a_noop_in_terminal_states_and_during_init() {
    for state in [
        EngineState::Initializing,
        EngineState::SucceededTimedOut,
        EngineState::SucceededUserConfirmed,
        EngineState::FailedTimedOut,
        EngineState::FailedUserRejected,
    ] {
        let (mut good, mut bad) = budgets(Timeout::Finite(PERIOD), Timeout::Finite(PERIOD));
        assert_eq!(on_tick(state, &mut good, &mut bad, PERIOD), state);
        assert_eq!(good.remaining(), Some(PERIOD));
        assert_eq!(bad.remaining(), Some(PERIOD));
    }
}

#[test]
fn truth_transitions_between_live_states() {
    let mut good = Budget::new(Timeout::Finite(Duration::from_secs(1)));
    let positive = Timeout::Finite(Duration::from_secs(1));
    assert_eq!(
        on_truth(EngineState::Undetermined, true, &mut good, positive),
        EngineState::ConditionTrue
    );
    assert_eq!(
        on_truth(EngineState::ConditionTrue, false, &mut good, positive),
        EngineState::ConditionFalse
    );
}

#[test]
fn good_budget_rearms_only_on_false_to_true_flip() {
    let positive = Timeout::Finite(Duration::from_secs(1));
    let mut good = Budget::new(positive);

    // Undetermined -> true: freshly armed budget is left alone.
    good.decrement(PERIOD);
    let state = on_truth(EngineState::Undetermined, true, &mut good, positive);
    assert_eq!(state, EngineState::ConditionTrue);
    assert_eq!(good.remaining(), Some(Duration::from_millis(900)));

    // true -> true re-entry: no reset.
    let state = on_truth(state, true, &mut good, positive);
    assert_eq!(state, EngineState::ConditionTrue);
    assert_eq!(good.remaining(), Some(Duration::from_millis(900)));

    // true -> false -> true: the second true-transition re-arms the full
    // positive timeout, not the partially consumed value.
    let state = on_truth(state, false, &mut good, positive);
    good.decrement(PERIOD);
    let state = on_truth(state, true, &mut good, positive);
    assert_eq!(state, EngineState::ConditionTrue);
    assert_eq!(good.remaining(), Some(Duration::from_secs(1)));
}

#[test]
fn truth_is_a_noop_in_terminal_states() {
    let positive = Timeout::Finite(Duration::from_secs(1));
    for state in [
        EngineState::SucceededUserConfirmed,
        EngineState::FailedTimedOut,
    ] {
        let mut good = Budget::new(positive);
        assert_eq!(on_truth(state, true, &mut good, positive), state);
    }
}

#[test]
fn confirm_maps_to_user_or_timeout_variant() {
    let live_good = Budget::new(Timeout::Finite(Duration::from_secs(1)));
    let expired_good = Budget::new(Timeout::ZERO);

    assert_eq!(
        on_confirm(EngineState::ConditionTrue, &live_good),
        Some(EngineState::SucceededUserConfirmed)
    );
    assert_eq!(
        on_confirm(EngineState::Undetermined, &live_good),
        Some(EngineState::SucceededUserConfirmed)
    );
    // Confirm racing the countdown: an already expired good budget records
    // the timeout variant.
    assert_eq!(
        on_confirm(EngineState::ConditionTrue, &expired_good),
        Some(EngineState::SucceededTimedOut)
    );
    assert_eq!(on_confirm(EngineState::ConditionFalse, &live_good), None);
    assert_eq!(on_confirm(EngineState::FailedTimedOut, &live_good), None);
}

#[test]
fn reject_maps_to_user_or_timeout_variant() {
    let live_bad = Budget::new(Timeout::Finite(Duration::from_secs(1)));
    let expired_bad = Budget::new(Timeout::ZERO);

    for state in [
        EngineState::Undetermined,
        EngineState::ConditionTrue,
        EngineState::ConditionFalse,
    ] {
        assert_eq!(
            on_reject(state, &live_bad),
            Some(EngineState::FailedUserRejected)
        );
    }
    assert_eq!(
        on_reject(EngineState::ConditionFalse, &expired_bad),
        Some(EngineState::FailedTimedOut)
    );
    assert_eq!(on_reject(EngineState::SucceededUserConfirmed, &live_bad), None);
    assert_eq!(on_reject(EngineState::Initializing, &live_bad), None);
}

#[test]
fn terminal_states_map_to_their_outcomes() {
    use crate::outcome::WaitOutcome;

    assert_eq!(
        EngineState::SucceededTimedOut.outcome(),
        Some(WaitOutcome::ConfirmedByTimeout)
    );
    assert_eq!(
        EngineState::SucceededUserConfirmed.outcome(),
        Some(WaitOutcome::ConfirmedByUser)
    );
    assert_eq!(
        EngineState::FailedTimedOut.outcome(),
        Some(WaitOutcome::FailedByTimeout)
    );
    assert_eq!(
        EngineState::FailedUserRejected.outcome(),
        Some(WaitOutcome::FailedByUser)
    );
    assert_eq!(EngineState::Undetermined.outcome(), None);
    assert!(!EngineState::ConditionTrue.is_terminal());
    assert!(EngineState::FailedUserRejected.is_terminal());
}
