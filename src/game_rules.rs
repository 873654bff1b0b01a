//! Traits defining the game semantics the search engine is parameterized by.
//!
//! The [`GameRules`] trait is the primary interface that must be implemented for
//! any game or decision process searched with [`MCTS`](crate::MCTS). Rules are a
//! value supplied once at engine construction; the engine never mutates them and
//! shares them between worker threads, so every method takes `&self`.

use std::fmt::Debug;

/// Integer identifier of a player/agent.
///
/// One value is reserved as the "no winner yet" sentinel, configured through
/// [`MCTSConfig::no_winner_sentinel`](crate::MCTSConfig::no_winner_sentinel).
/// A state whose winner is anything other than the sentinel is terminal, so
/// games that can end in a draw need a dedicated agent index for it.
pub type AgentIndex = u32;

/// Default value of the "no winner / still ongoing" sentinel
pub const NO_WINNER: AgentIndex = 0;

/// Game semantics required by the search
///
/// All methods must be pure: the same inputs always produce the same outputs,
/// and nothing observable changes as a side effect. Rollouts and expansions
/// call them from several threads at once in the parallel drivers.
///
/// # Example
///
/// ```
/// use arena_mcts::{AgentIndex, GameRules};
///
/// /// Take one or two stones; whoever takes the last stone wins.
/// struct Nim;
///
/// #[derive(Clone, Debug)]
/// struct Heap { stones: u8, to_move: AgentIndex }
///
/// impl GameRules for Nim {
///     type State = Heap;
///     type Action = u8;
///     type Outcome = AgentIndex;
///
///     fn transition(&self, state: &Heap, take: &u8) -> Heap {
///         Heap { stones: state.stones - take, to_move: 3 - state.to_move }
///     }
///
///     fn enumerate_actions(&self, state: &Heap) -> Vec<u8> {
///         (1..=state.stones.min(2)).collect()
///     }
///
///     fn determine_winner(&self, state: &Heap) -> AgentIndex {
///         // The player who just moved took the last stone.
///         if state.stones == 0 { 3 - state.to_move } else { 0 }
///     }
///
///     fn state_to_outcome(&self, _state: &Heap, winner: AgentIndex) -> AgentIndex {
///         winner
///     }
///
///     fn should_credit_reward(&self, observer: &Heap, winner: &AgentIndex) -> bool {
///         // A node is credited when the player who moved into it won.
///         *winner == 3 - observer.to_move
///     }
/// }
/// ```
pub trait GameRules: Send + Sync {
    /// Full game state stored (by value) in every search node
    type State: Clone + Debug + Send + Sync;

    /// A move that can be applied to a state
    type Action: Clone + Debug + PartialEq + Send + Sync;

    /// Result of a finished (or abandoned) playout
    type Outcome: Clone + Debug + Send + Sync;

    /// Applies an action, returning the successor state without modifying the
    /// original
    fn transition(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Returns every legal action from `state`
    ///
    /// Must be non-empty for any non-terminal state. The order is significant:
    /// nodes expand their children in exactly this order.
    fn enumerate_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Returns the winner of `state`, or the configured no-winner sentinel
    /// while the game is still going
    fn determine_winner(&self, state: &Self::State) -> AgentIndex;

    /// Maps a final state and its winner to an outcome
    ///
    /// `winner` is the sentinel when a rollout was cut short by the rollout
    /// depth bound or by a state with no actions.
    fn state_to_outcome(&self, state: &Self::State, winner: AgentIndex) -> Self::Outcome;

    /// Decides whether the node holding `observer` gets its win counter
    /// incremented for `outcome`
    ///
    /// The usual convention is to credit a node when the agent who moved
    /// *into* `observer` is the winner, so that a child's win rate is the
    /// value of that move for the player choosing among siblings.
    fn should_credit_reward(&self, observer: &Self::State, outcome: &Self::Outcome) -> bool;
}
