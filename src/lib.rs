//! # arena-mcts
//!
//! A Monte Carlo Tree Search (MCTS) engine with arena-allocated nodes and
//! three execution strategies.
//!
//! The engine is generic over the game: everything it knows about a game comes
//! from a [`GameRules`] implementation supplied at construction. Nodes live in
//! fixed-capacity [arenas](arena), so a search never allocates per node and
//! degrades gracefully when the node budget runs out.
//!
//! ## Features
//!
//! - Generic implementation that works with any game or decision process
//! - Single-threaded, lock-free tree-parallel and root-parallel drivers
//! - Fixed-capacity linear (bump) and stack (reclaimable) node arenas
//! - Pluggable tree, rollout and root selection policies (UCB1 by default)
//! - Reproducible searches from a seed
//! - Search statistics and tree snapshots
//!
//! ## Basic Usage
//!
//! ```
//! use arena_mcts::{AgentIndex, GameRules, MCTS, MCTSConfig};
//!
//! /// Take one or two stones; whoever takes the last stone wins.
//! struct Nim;
//!
//! #[derive(Clone, Debug)]
//! struct Heap {
//!     stones: u8,
//!     to_move: AgentIndex,
//! }
//!
//! impl GameRules for Nim {
//!     type State = Heap;
//!     type Action = u8;
//!     type Outcome = AgentIndex;
//!
//!     fn transition(&self, state: &Heap, take: &u8) -> Heap {
//!         Heap { stones: state.stones - take, to_move: 3 - state.to_move }
//!     }
//!
//!     fn enumerate_actions(&self, state: &Heap) -> Vec<u8> {
//!         (1..=state.stones.min(2)).collect()
//!     }
//!
//!     fn determine_winner(&self, state: &Heap) -> AgentIndex {
//!         if state.stones == 0 { 3 - state.to_move } else { 0 }
//!     }
//!
//!     fn state_to_outcome(&self, _state: &Heap, winner: AgentIndex) -> AgentIndex {
//!         winner
//!     }
//!
//!     fn should_credit_reward(&self, observer: &Heap, winner: &AgentIndex) -> bool {
//!         *winner == 3 - observer.to_move
//!     }
//! }
//!
//! fn main() -> Result<(), arena_mcts::MCTSError> {
//!     let config = MCTSConfig::default()
//!         .with_max_iterations_per_thread(2_000)
//!         .with_seed(42);
//!
//!     let mut mcts = MCTS::new(Nim, Heap { stones: 4, to_move: 1 }, config);
//!
//!     // Leaving a multiple of three stones wins.
//!     let take = mcts.search()?;
//!     assert_eq!(take, 1);
//!
//!     println!("{}", mcts.get_statistics().summary());
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Every iteration starts at the root and runs four phases:
//!
//! 1. **Selection**: Each node entered records a visit. Fully expanded nodes
//!    pass on to the child with the best [tree policy](policy::TreePolicy)
//!    score.
//!
//! 2. **Expansion**: The first node with an unexpanded action turns the next
//!    action, in enumeration order, into a child allocated from the worker's
//!    arena.
//!
//! 3. **Simulation**: From the new node, a [default policy](policy::DefaultPolicy)
//!    plays the game out, by default uniformly at random.
//!
//! 4. **Backpropagation**: Every node on the path whose state the rules credit
//!    with the outcome records a win.
//!
//! ## Parallel Search
//!
//! [`SearchStrategy::TreeParallel`](config::SearchStrategy::TreeParallel)
//! runs `thread_count` workers on one shared tree, each allocating from its own
//! arena and updating shared counters with relaxed atomics.
//! [`SearchStrategy::RootParallel`](config::SearchStrategy::RootParallel)
//! runs independent trees and sums their root statistics before choosing.

pub mod arena;
pub mod config;
pub mod game_rules;
pub mod mcts;
pub mod parallel;
pub mod policy;
pub mod snapshot;
pub mod stats;
pub mod tree;
pub mod utils;

pub use arena::{Arena, LinearArena, StackArena};
pub use config::MCTSConfig;
pub use game_rules::{AgentIndex, GameRules, NO_WINNER};
pub use mcts::MCTS;
pub use parallel::merge_child_stats;
pub use policy::{DefaultPolicy, RootSelection, TreePolicy};
pub use snapshot::NodeSnapshot;
pub use stats::{ChildStats, SearchStatistics, StopReason};
pub use tree::{NodeId, SearchNode, SearchTree};

/// Error types for the MCTS algorithm
#[derive(thiserror::Error, Debug)]
pub enum MCTSError {
    /// No legal actions are available from the root state
    #[error("No legal actions available from current state")]
    NoLegalActions,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The root node could not be allocated
    #[error("Node arena exhausted before the root could be allocated")]
    ArenaExhausted,

    /// A worker thread panicked
    #[error("Search worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Result type for MCTS operations
pub type Result<T> = std::result::Result<T, MCTSError>;
