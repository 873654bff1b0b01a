//! Default (rollout) policies for the MCTS algorithm
//!
//! Default policies choose the moves of a simulated playout. They receive the
//! calling worker's random number generator, so a seeded search is
//! reproducible.

use rand::{Rng, RngCore};

use crate::game_rules::GameRules;

/// Trait for policies that pick rollout moves
pub trait DefaultPolicy<G: GameRules>: Send + Sync {
    /// Returns the index into `actions` of the move to play from `state`
    ///
    /// `actions` is never empty. An out-of-range index is treated as 0.
    fn choose(&self, state: &G::State, actions: &[G::Action], rng: &mut dyn RngCore) -> usize;
}

/// Random simulation policy
///
/// This policy plays uniformly random legal moves until the game ends.
#[derive(Debug, Clone)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Creates a new random policy
    pub fn new() -> Self {
        RandomPolicy
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GameRules> DefaultPolicy<G> for RandomPolicy {
    fn choose(&self, _state: &G::State, actions: &[G::Action], rng: &mut dyn RngCore) -> usize {
        rng.gen_range(0..actions.len())
    }
}

/// Default policy backed by a closure, for domain-specific playouts
///
/// # Example
///
/// ```
/// use arena_mcts::policy::FnDefaultPolicy;
///
/// // Always play the first listed move.
/// let first = FnDefaultPolicy::new(|_state: &u8, _actions: &[u8], _rng: &mut dyn rand::RngCore| 0);
/// # let _ = first;
/// ```
#[derive(Clone)]
pub struct FnDefaultPolicy<F> {
    choose: F,
}

impl<F> FnDefaultPolicy<F> {
    /// Wraps `choose`
    pub fn new(choose: F) -> Self {
        FnDefaultPolicy { choose }
    }
}

impl<G, F> DefaultPolicy<G> for FnDefaultPolicy<F>
where
    G: GameRules,
    F: Fn(&G::State, &[G::Action], &mut dyn RngCore) -> usize + Send + Sync,
{
    fn choose(&self, state: &G::State, actions: &[G::Action], rng: &mut dyn RngCore) -> usize {
        (self.choose)(state, actions, rng)
    }
}
