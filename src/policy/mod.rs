//! Policies for the pluggable phases of the MCTS algorithm
//!
//! This module contains the policies the engine receives at construction:
//! - Tree policies: How to score children during selection
//! - Default (rollout) policies: How to play out games from a node
//! - Root selection policies: How to pick the final action

pub mod root;
pub mod selection;
pub mod simulation;

pub use root::RootSelection;
pub use selection::{FnTreePolicy, TreePolicy, UCB1Policy};
pub use simulation::{DefaultPolicy, FnDefaultPolicy, RandomPolicy};
