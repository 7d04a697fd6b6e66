use replay_core::{advance, RunEvent, RunState};

#[test]
fn start_moves_to_first_strategy() {
    let state = advance(RunState::NotStarted, RunEvent::Start, 5);
    assert_eq!(state, RunState::TryingStrategy(0));
    assert_eq!(state.current_strategy(), Some(0));
}

#[test]
fn first_non_empty_strategy_wins() {
    let mut state = advance(RunState::NotStarted, RunEvent::Start, 5);
    state = advance(state, RunEvent::Empty, 5);
    state = advance(state, RunEvent::Failed, 5);
    assert_eq!(state, RunState::TryingStrategy(2));

    state = advance(state, RunEvent::Yielded(3), 5);
    assert_eq!(state, RunState::Succeeded(2));
    assert!(state.is_terminal());

    // terminal states ignore further events
    assert_eq!(advance(state, RunEvent::Empty, 5), RunState::Succeeded(2));
}

#[test]
fn zero_yield_counts_as_empty() {
    let state = advance(RunState::TryingStrategy(1), RunEvent::Yielded(0), 5);
    assert_eq!(state, RunState::TryingStrategy(2));
}

#[test]
fn all_empty_exhausts() {
    let mut state = advance(RunState::NotStarted, RunEvent::Start, 3);
    for _ in 0..3 {
        state = advance(state, RunEvent::Empty, 3);
    }
    assert_eq!(state, RunState::Exhausted);
    assert_eq!(state.current_strategy(), None);
}

#[test]
fn no_strategies_exhausts_immediately() {
    assert_eq!(
        advance(RunState::NotStarted, RunEvent::Start, 0),
        RunState::Exhausted
    );
}

#[test]
fn events_before_start_are_ignored() {
    assert_eq!(
        advance(RunState::NotStarted, RunEvent::Yielded(4), 5),
        RunState::NotStarted
    );
}
