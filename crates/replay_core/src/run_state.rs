/// Where an extraction run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    /// Evaluating the strategy at this position in priority order.
    TryingStrategy(usize),
    /// The strategy at this position produced posts; nothing else runs.
    Succeeded(usize),
    /// Every strategy came back empty.
    Exhausted,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded(_) | RunState::Exhausted)
    }

    /// Index of the strategy that should run next, if any.
    pub fn current_strategy(self) -> Option<usize> {
        match self {
            RunState::TryingStrategy(i) => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    Start,
    /// The current strategy returned this many posts (zero counts as empty).
    Yielded(usize),
    /// The current strategy returned nothing usable.
    Empty,
    /// The current strategy raised; treated like `Empty`.
    Failed,
}

/// Pure transition function for an orchestrator run over `strategy_count`
/// strategies. Events that make no sense in the current state are ignored.
pub fn advance(state: RunState, event: RunEvent, strategy_count: usize) -> RunState {
    match (state, event) {
        (RunState::NotStarted, RunEvent::Start) => first_or_exhausted(0, strategy_count),
        (RunState::TryingStrategy(i), RunEvent::Yielded(count)) if count > 0 => {
            RunState::Succeeded(i)
        }
        (
            RunState::TryingStrategy(i),
            RunEvent::Yielded(_) | RunEvent::Empty | RunEvent::Failed,
        ) => first_or_exhausted(i + 1, strategy_count),
        (state, _) => state,
    }
}

fn first_or_exhausted(next: usize, strategy_count: usize) -> RunState {
    if next < strategy_count {
        RunState::TryingStrategy(next)
    } else {
        RunState::Exhausted
    }
}
