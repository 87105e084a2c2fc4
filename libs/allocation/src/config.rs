//! Engine tuning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of day counts tried above the estimate during a rebuild.
pub const DEFAULT_EXTRA_CANDIDATE_DAYS: u32 = 2;

/// Default bound on rebalance moves per repair run. Rebalancing settles far
/// below this on any schedule the API accepts.
pub const DEFAULT_MAX_REBALANCE_MOVES: u32 = 10_000;

/// Default score penalty per day a task touches in window search.
pub const DEFAULT_FRAGMENT_PENALTY: u32 = 10;

/// Which distribution strategy places each task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Score every contiguous window and water-fill inside the best one.
    #[default]
    WindowSearch,

    /// Minute-exhaustion loop over the least-loaded days.
    GreedySplit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowSearch => write!(f, "window"),
            Self::GreedySplit => write!(f, "greedy"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" | "window_search" => Ok(Self::WindowSearch),
            "greedy" | "greedy_split" => Ok(Self::GreedySplit),
            other => Err(format!(
                "unknown distribution strategy '{other}' (expected 'window' or 'greedy')"
            )),
        }
    }
}

/// Allocation engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationConfig {
    /// Distribution strategy.
    pub strategy: Strategy,

    /// Extra day counts tried above `ceil(total / capacity)`.
    pub extra_candidate_days: u32,

    /// Upper bound on rebalance moves per repair run.
    pub max_rebalance_moves: u32,

    /// Score added per touched day when comparing windows.
    pub fragment_penalty: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            extra_candidate_days: DEFAULT_EXTRA_CANDIDATE_DAYS,
            max_rebalance_moves: DEFAULT_MAX_REBALANCE_MOVES,
            fragment_penalty: DEFAULT_FRAGMENT_PENALTY,
        }
    }
}

impl AllocationConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_rebalance_moves(mut self, moves: u32) -> Self {
        self.max_rebalance_moves = moves;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("window".parse::<Strategy>(), Ok(Strategy::WindowSearch));
        assert_eq!("GREEDY".parse::<Strategy>(), Ok(Strategy::GreedySplit));
        assert!("exhaustive".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_display_parses_back() {
        for strategy in [Strategy::WindowSearch, Strategy::GreedySplit] {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
    }
}
