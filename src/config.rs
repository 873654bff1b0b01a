//! Configuration options for the MCTS algorithm
//!
//! This module defines the configuration parameters that control the
//! behavior of the search and its parallel drivers.

use std::time::Duration;

use crate::{game_rules::AgentIndex, game_rules::NO_WINNER, MCTSError, Result};

/// Criteria for selecting the best child after search is complete
///
/// This determines how the final action is selected after the search budget is
/// exhausted. It is the default [`RootSelection`](crate::policy::RootSelection)
/// policy and is applied to aggregated statistics in root-parallel searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BestChildCriteria {
    /// Select the child with the most visits
    ///
    /// This is generally more robust and conservative, as it relies on
    /// statistical confidence rather than potentially noisy value estimates.
    /// Ties go to the child whose action comes first.
    MostVisits,

    /// Select the child with the highest win rate
    ///
    /// This can be more aggressive by favoring high-value moves even if they
    /// haven't been visited as often.
    HighestValue,
}

/// Which driver [`MCTS::search`](crate::MCTS::search) runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStrategy {
    /// One tree, one arena, the calling thread
    SingleThreaded,

    /// `thread_count` workers descend and grow one shared tree, each
    /// allocating nodes from a private arena
    TreeParallel,

    /// `thread_count` independent trees whose root statistics are merged
    /// after all workers finish
    RootParallel,
}

/// Configuration for the MCTS algorithm
///
/// This struct contains all parameters that control the behavior of the MCTS search.
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use arena_mcts::{MCTSConfig, config::SearchStrategy};
/// use std::time::Duration;
///
/// let config = MCTSConfig::default()
///     .with_strategy(SearchStrategy::RootParallel)
///     .with_thread_count(4)
///     .with_max_iterations_per_thread(10_000)
///     .with_max_nodes_per_thread(50_000)
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MCTSConfig {
    /// Exploration constant `C` of the UCB1 tree policy
    ///
    /// The score is `avg + C * sqrt(2 * ln(parent_visits) / child_visits)`.
    /// The standard value is sqrt(2).
    pub exploration_constant: f64,

    /// Wall-clock budget for one search
    ///
    /// Checked by every worker once per iteration.
    pub timeout: Option<Duration>,

    /// Maximum number of iterations each worker runs
    pub max_iterations_per_thread: usize,

    /// Capacity of each worker's node arena
    ///
    /// The root node takes one slot of the first worker's arena.
    pub max_nodes_per_thread: usize,

    /// Number of worker threads used by the parallel strategies
    ///
    /// Zero is corrected to one by [`validate`](MCTSConfig::validate).
    pub thread_count: usize,

    /// The agent index that [`GameRules::determine_winner`](crate::GameRules::determine_winner)
    /// returns while a game is still going
    pub no_winner_sentinel: AgentIndex,

    /// Driver used by [`MCTS::search`](crate::MCTS::search)
    pub strategy: SearchStrategy,

    /// Upper bound on the number of moves in one rollout
    pub max_rollout_depth: usize,

    /// Whether rule-contract violations are reported
    ///
    /// When enabled, a non-terminal state without actions and a rollout hitting
    /// `max_rollout_depth` are logged as warnings. The search behaves the same
    /// either way.
    pub contract_checks: bool,

    /// Whether a worker stops as soon as its arena is full
    ///
    /// When disabled, the worker keeps iterating over the existing tree and
    /// simulates from the deepest node it reaches instead of expanding.
    pub halt_on_full_arena: bool,

    /// Base seed for the per-worker random number generators
    ///
    /// When unset, every search seeds from system entropy.
    pub seed: Option<u64>,

    /// Criteria for selecting the best child after search
    pub best_child_criteria: BestChildCriteria,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        MCTSConfig {
            exploration_constant: std::f64::consts::SQRT_2,
            timeout: None,
            max_iterations_per_thread: 10_000,
            max_nodes_per_thread: 100_000,
            thread_count: 1,
            no_winner_sentinel: NO_WINNER,
            strategy: SearchStrategy::SingleThreaded,
            max_rollout_depth: 10_000,
            contract_checks: cfg!(debug_assertions),
            halt_on_full_arena: true,
            seed: None,
            best_child_criteria: BestChildCriteria::MostVisits,
        }
    }
}

impl MCTSConfig {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the wall-clock budget for one search
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum number of iterations per worker
    pub fn with_max_iterations_per_thread(mut self, iterations: usize) -> Self {
        self.max_iterations_per_thread = iterations;
        self
    }

    /// Sets the arena capacity per worker
    pub fn with_max_nodes_per_thread(mut self, nodes: usize) -> Self {
        self.max_nodes_per_thread = nodes;
        self
    }

    /// Sets the number of workers
    pub fn with_thread_count(mut self, threads: usize) -> Self {
        self.thread_count = threads;
        self
    }

    /// Sets the no-winner sentinel
    pub fn with_no_winner_sentinel(mut self, sentinel: AgentIndex) -> Self {
        self.no_winner_sentinel = sentinel;
        self
    }

    /// Sets the search strategy
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the rollout length bound
    pub fn with_max_rollout_depth(mut self, depth: usize) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    /// Enables or disables contract-violation warnings
    pub fn with_contract_checks(mut self, enabled: bool) -> Self {
        self.contract_checks = enabled;
        self
    }

    /// Sets whether workers stop once their arena is full
    pub fn with_halt_on_full_arena(mut self, halt: bool) -> Self {
        self.halt_on_full_arena = halt;
        self
    }

    /// Seeds the per-worker random number generators
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the criteria for selecting the best child
    pub fn with_best_child_criteria(mut self, criteria: BestChildCriteria) -> Self {
        self.best_child_criteria = criteria;
        self
    }

    /// Checks the configuration and returns a normalized copy
    ///
    /// A zero `thread_count` is not an error: it is corrected to one with a
    /// warning.
    pub fn validate(&self) -> Result<MCTSConfig> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MCTSError::InvalidConfiguration(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if self.max_nodes_per_thread == 0 {
            return Err(MCTSError::InvalidConfiguration(
                "max_nodes_per_thread must leave room for the root node".to_string(),
            ));
        }
        if self.max_rollout_depth == 0 {
            return Err(MCTSError::InvalidConfiguration(
                "max_rollout_depth must be at least 1".to_string(),
            ));
        }

        let mut config = self.clone();
        if config.thread_count == 0 {
            log::warn!("thread_count is 0, using a single worker");
            config.thread_count = 1;
        }
        Ok(config)
    }
}
