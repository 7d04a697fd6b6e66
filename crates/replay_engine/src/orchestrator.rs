use replay_core::{advance, order_for_delivery, ExtractedPost, RunEvent, RunState};
use replay_logging::{replay_info, replay_warn};

use crate::strategy::{standard_strategies, SiteContext, Strategy};

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// `Succeeded` or `Exhausted`.
    pub state: RunState,
    /// Name of the strategy whose output was kept.
    pub strategy: Option<&'static str>,
    /// Delivery-ordered posts; empty when exhausted.
    pub posts: Vec<ExtractedPost>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Tries strategies in priority order and keeps the first non-empty result.
pub struct Orchestrator {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Orchestrator {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Structured archive, sitemap, platform API, link archive, snapshot.
    pub fn standard() -> Self {
        Self::new(standard_strategies())
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, site: &SiteContext<'_>) -> RunReport {
        let count = self.strategies.len();
        let mut state = advance(RunState::NotStarted, RunEvent::Start, count);
        let mut kept = Vec::new();

        while let Some(index) = state.current_strategy() {
            let Some(strategy) = self.strategies.get(index) else {
                break;
            };
            replay_info!("Trying {}...", strategy.name());
            let event = match strategy.evaluate(site).await {
                Ok(Some(posts)) if !posts.is_empty() => {
                    replay_info!("{} found {} posts", strategy.name(), posts.len());
                    let found = posts.len();
                    kept = posts;
                    RunEvent::Yielded(found)
                }
                Ok(_) => RunEvent::Empty,
                Err(err) => {
                    replay_warn!("{} failed: {}", strategy.name(), err);
                    RunEvent::Failed
                }
            };
            state = advance(state, event, count);
        }

        match state {
            RunState::Succeeded(index) => {
                order_for_delivery(&mut kept);
                RunReport {
                    state,
                    strategy: self.strategies.get(index).map(|s| s.name()),
                    posts: kept,
                }
            }
            _ => {
                replay_warn!("All strategies failed for {}", site.base());
                RunReport {
                    state: RunState::Exhausted,
                    strategy: None,
                    posts: Vec::new(),
                }
            }
        }
    }
}
