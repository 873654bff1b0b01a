//! Tree policies for the MCTS algorithm
//!
//! Tree policies score the children of a fully expanded node during the
//! selection phase, balancing exploration and exploitation. The child with
//! the highest score is entered; ties go to the child whose action comes first.

use crate::{game_rules::GameRules, tree::SearchNode, utils};

/// Trait for policies that score children during selection
pub trait TreePolicy<G: GameRules>: Send + Sync {
    /// Scores `child` as a candidate for descent from `parent`
    fn score(&self, parent: &SearchNode<G>, child: &SearchNode<G>) -> f64;
}

/// Upper Confidence Bound 1 (UCB1) tree policy
///
/// This is the classic tree policy for MCTS:
///
/// ```text
/// UCB1 = win_rate + exploration_constant * sqrt(2 * ln(parent_visits) / child_visits)
/// ```
///
/// Where:
/// - `win_rate` is the fraction of the child's visits credited as wins
/// - `exploration_constant` controls the balance between exploration and exploitation
/// - `parent_visits` is the number of visits to the parent node
/// - `child_visits` is the number of visits to the child node
///
/// Higher exploration constants favor exploration (trying less-visited nodes),
/// while lower values favor exploitation (choosing nodes with higher values).
/// The default exploration constant is sqrt(2).
#[derive(Debug, Clone)]
pub struct UCB1Policy {
    /// Exploration constant that controls the balance between exploration and exploitation.
    pub exploration_constant: f64,
}

impl UCB1Policy {
    /// Creates a new UCB1 policy with the given exploration constant
    pub fn new(exploration_constant: f64) -> Self {
        UCB1Policy {
            exploration_constant,
        }
    }

    /// Calculates the UCB1 value from raw counts
    pub fn ucb1_value(&self, child_wins: u64, child_visits: u64, parent_visits: u64) -> f64 {
        utils::ucb1_value(
            child_wins,
            child_visits,
            parent_visits,
            self.exploration_constant,
        )
    }
}

impl Default for UCB1Policy {
    fn default() -> Self {
        Self::new(std::f64::consts::SQRT_2)
    }
}

impl<G: GameRules> TreePolicy<G> for UCB1Policy {
    fn score(&self, parent: &SearchNode<G>, child: &SearchNode<G>) -> f64 {
        self.ucb1_value(child.wins(), child.visits(), parent.visits())
    }
}

/// Tree policy backed by a closure
///
/// # Example
///
/// ```
/// use arena_mcts::{policy::FnTreePolicy, GameRules, SearchNode};
///
/// // Pure exploitation: always descend into the best win rate.
/// fn greedy<G: GameRules>() -> FnTreePolicy<impl Fn(&SearchNode<G>, &SearchNode<G>) -> f64> {
///     FnTreePolicy::new(|_parent: &SearchNode<G>, child: &SearchNode<G>| child.win_rate())
/// }
/// ```
#[derive(Clone)]
pub struct FnTreePolicy<F> {
    score: F,
}

impl<F> FnTreePolicy<F> {
    /// Wraps `score`
    pub fn new(score: F) -> Self {
        FnTreePolicy { score }
    }
}

impl<G, F> TreePolicy<G> for FnTreePolicy<F>
where
    G: GameRules,
    F: Fn(&SearchNode<G>, &SearchNode<G>) -> f64 + Send + Sync,
{
    fn score(&self, parent: &SearchNode<G>, child: &SearchNode<G>) -> f64 {
        (self.score)(parent, child)
    }
}
