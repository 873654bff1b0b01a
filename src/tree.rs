//! Tree data structures for Monte Carlo Tree Search
//!
//! Nodes live in [`Arena`]s and refer to each other through [`NodeId`]
//! handles. A [`SearchTree`] owns one arena per worker and runs the four
//! phases of an iteration (selection, expansion, simulation and
//! backpropagation) against them.
//!
//! All counters are atomics and every child slot is a write-once cell, so a
//! tree can be searched through a shared reference from several threads at
//! once. Counter updates use relaxed ordering: concurrent workers may read
//! slightly stale statistics, which only affects which child they descend
//! into, never the validity of the tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;

use rand::RngCore;

use crate::{
    arena::{Arena, LinearArena},
    config::MCTSConfig,
    game_rules::{AgentIndex, GameRules},
    policy::{DefaultPolicy, TreePolicy},
    stats::ChildStats,
    MCTSError, Result,
};

/// Handle of a node: the arena that owns it and the slot inside that arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Index of the owning arena (the worker that created the node)
    pub arena: usize,

    /// Slot inside the owning arena
    pub slot: usize,
}

/// Represents a node in the MCTS tree
///
/// Each node owns a copy of its game state, enumerates the state's actions
/// once, and keeps one child slot per action. Children are created lazily, in
/// action order, and never removed while the tree is alive.
pub struct SearchNode<G: GameRules> {
    state: G::State,
    winner: AgentIndex,
    terminal: bool,
    actions: Vec<G::Action>,
    children: Box<[OnceLock<NodeId>]>,
    next_action: AtomicUsize,
    visits: AtomicU64,
    wins: AtomicU64,
    depth: usize,
}

impl<G: GameRules> SearchNode<G> {
    /// Creates a node for `state` at the given depth
    ///
    /// The winner is determined once here. Actions are only enumerated for
    /// non-terminal states, so a terminal node never expands. Construction
    /// counts as the node's first visit.
    pub fn new(rules: &G, state: G::State, depth: usize, config: &MCTSConfig) -> Self {
        let winner = rules.determine_winner(&state);
        let terminal = winner != config.no_winner_sentinel;
        let actions = if terminal {
            Vec::new()
        } else {
            rules.enumerate_actions(&state)
        };

        if !terminal && actions.is_empty() && config.contract_checks {
            log::warn!(
                "non-terminal state at depth {} has no legal actions: {:?}",
                depth,
                state
            );
        }

        let children = (0..actions.len()).map(|_| OnceLock::new()).collect();

        SearchNode {
            state,
            winner,
            terminal,
            actions,
            children,
            next_action: AtomicUsize::new(0),
            visits: AtomicU64::new(1),
            wins: AtomicU64::new(0),
            depth,
        }
    }

    /// The game state at this node
    pub fn state(&self) -> &G::State {
        &self.state
    }

    /// The winner determined at construction (the sentinel if ongoing)
    pub fn winner(&self) -> AgentIndex {
        self.winner
    }

    /// Returns true if the state has a winner
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The actions enumerated at construction, in expansion order
    pub fn actions(&self) -> &[G::Action] {
        &self.actions
    }

    /// Depth of this node in the tree (root = 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of visits to this node
    pub fn visits(&self) -> u64 {
        self.visits.load(Ordering::Relaxed)
    }

    /// Returns the number of visits credited as wins
    pub fn wins(&self) -> u64 {
        self.wins.load(Ordering::Relaxed)
    }

    /// Returns the fraction of visits credited as wins
    pub fn win_rate(&self) -> f64 {
        crate::utils::win_rate(self.wins(), self.visits())
    }

    /// Increments the visit count
    pub fn record_visit(&self) {
        self.visits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the win count
    pub fn record_win(&self) {
        self.wins.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns true if every action has been claimed for expansion
    pub fn is_fully_expanded(&self) -> bool {
        self.next_action.load(Ordering::Acquire) >= self.actions.len()
    }

    /// Returns the child created for the action at `action_index`, if any
    pub fn child(&self, action_index: usize) -> Option<NodeId> {
        self.children.get(action_index)?.get().copied()
    }

    /// Iterates over the published children as `(action_index, id)` pairs
    pub fn children(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.get().map(|id| (index, *id)))
    }

    /// Number of children published so far
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Claims the next unexpanded action, in enumeration order
    fn claim_next_action(&self) -> Option<usize> {
        let count = self.actions.len();
        self.next_action
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < count).then_some(next + 1)
            })
            .ok()
    }

    /// Hands a claimed action back when its child could not be allocated
    ///
    /// Succeeds only while no later action has been claimed; otherwise the
    /// action stays unexpanded and the node keeps selecting among the others.
    fn release_action(&self, action_index: usize) -> bool {
        self.next_action
            .compare_exchange(action_index + 1, action_index, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn publish_child(&self, action_index: usize, id: NodeId) {
        if let Some(slot) = self.children.get(action_index) {
            // The index was claimed exclusively, so the slot is still empty.
            let published = slot.set(id).is_ok();
            debug_assert!(published, "child slot {} published twice", action_index);
        }
    }
}

impl<G: GameRules> fmt::Debug for SearchNode<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNode")
            .field("state", &self.state)
            .field("winner", &self.winner)
            .field("depth", &self.depth)
            .field("visits", &self.visits())
            .field("wins", &self.wins())
            .field("actions", &self.actions.len())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Borrowed collaborators an iteration needs
pub struct SearchContext<'a, G: GameRules> {
    /// Game semantics
    pub rules: &'a G,

    /// Scores children during selection
    pub tree_policy: &'a dyn TreePolicy<G>,

    /// Picks moves during rollouts
    pub default_policy: &'a dyn DefaultPolicy<G>,

    /// Search settings
    pub config: &'a MCTSConfig,
}

impl<G: GameRules> Clone for SearchContext<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: GameRules> Copy for SearchContext<'_, G> {}

/// The nodes visited by one iteration, root first
#[derive(Debug, Clone, Default)]
pub struct NodePath {
    /// Node handles from the root down to the simulated node
    pub ids: Vec<NodeId>,
}

impl NodePath {
    /// Creates a path starting at `root`
    pub fn from_root(root: NodeId) -> Self {
        NodePath { ids: vec![root] }
    }

    /// Extends the path with a new node
    pub fn push(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    /// Returns the length of the path
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the path is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The last node of the path
    pub fn leaf(&self) -> Option<NodeId> {
        self.ids.last().copied()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path[")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}:{}", id.arena, id.slot)?;
        }
        write!(f, "]")
    }
}

/// What a single iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    /// Depth of the node the simulation started from
    pub depth: usize,

    /// Whether a new node was created
    pub expanded: bool,
}

/// A search tree spread over one arena per worker
pub struct SearchTree<G: GameRules, A: Arena<SearchNode<G>> = LinearArena<SearchNode<G>>> {
    arenas: Vec<A>,
    root: NodeId,
    _rules: std::marker::PhantomData<fn() -> G>,
}

impl<G: GameRules, A: Arena<SearchNode<G>>> SearchTree<G, A> {
    /// Builds a tree over `arenas`, allocating the root in the first one
    pub fn new(ctx: SearchContext<'_, G>, root_state: G::State, arenas: Vec<A>) -> Result<Self> {
        let first = arenas.first().ok_or(MCTSError::ArenaExhausted)?;
        let root = SearchNode::new(ctx.rules, root_state, 0, ctx.config);
        let slot = first.construct(root).ok_or(MCTSError::ArenaExhausted)?;

        Ok(SearchTree {
            arenas,
            root: NodeId { arena: 0, slot },
            _rules: std::marker::PhantomData,
        })
    }

    /// Handle of the root node
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The root node
    pub fn root(&self) -> Option<&SearchNode<G>> {
        self.node(self.root)
    }

    /// Looks up a node by handle
    pub fn node(&self, id: NodeId) -> Option<&SearchNode<G>> {
        self.arenas.get(id.arena)?.get(id.slot)
    }

    /// The arena owned by worker `index`
    pub fn arena(&self, index: usize) -> Option<&A> {
        self.arenas.get(index)
    }

    /// Number of arenas (workers) backing the tree
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// Total number of nodes allocated across all arenas
    pub fn node_count(&self) -> usize {
        self.arenas.iter().map(|arena| arena.len()).sum()
    }

    /// Gives the arenas back, dropping the tree
    pub fn into_arenas(self) -> Vec<A> {
        self.arenas
    }

    /// Visit and win counts of every root child, in action order
    ///
    /// Actions that were never expanded are reported with zero visits, so the
    /// result always has one entry per root action.
    pub fn root_child_stats(&self) -> Vec<ChildStats> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        (0..root.actions().len())
            .map(|action_index| {
                let child = root.child(action_index).and_then(|id| self.node(id));
                ChildStats {
                    action_index,
                    visits: child.map_or(0, SearchNode::visits),
                    wins: child.map_or(0, SearchNode::wins),
                }
            })
            .collect()
    }

    /// Visits every node reachable from the root, depth first
    pub fn for_each_node<F: FnMut(NodeId, &SearchNode<G>)>(&self, mut visit: F) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            visit(id, node);
            stack.extend(node.children().map(|(_, child)| child));
        }
    }

    /// Runs one iteration from the root, allocating new nodes in arena `arena`
    ///
    /// 1. Selection: every node entered gets a visit. Terminal nodes end the
    ///    descent; nodes with unclaimed actions go to expansion; otherwise the
    ///    child with the best tree-policy score (first one on ties) is entered.
    /// 2. Expansion: the next action is turned into a child. When the arena is
    ///    full or construction fails, no child is created and the simulation
    ///    starts from the current node instead.
    /// 3. Simulation: a rollout with the default policy from the leaf state.
    /// 4. Backpropagation: each node on the path gets a win if the rules
    ///    credit it with the outcome.
    pub fn iterate(
        &self,
        ctx: SearchContext<'_, G>,
        arena: usize,
        rng: &mut dyn RngCore,
    ) -> Iteration {
        let (path, expanded) = self.select_and_expand(ctx, arena);
        let Some(leaf) = path.leaf().and_then(|id| self.node(id)) else {
            return Iteration {
                depth: 0,
                expanded,
            };
        };

        let outcome = if leaf.is_terminal() {
            ctx.rules.state_to_outcome(leaf.state(), leaf.winner())
        } else {
            simulate(ctx, leaf.state(), rng)
        };

        self.backpropagate(ctx, &path, &outcome);

        Iteration {
            depth: leaf.depth(),
            expanded,
        }
    }

    fn select_and_expand(&self, ctx: SearchContext<'_, G>, arena: usize) -> (NodePath, bool) {
        let mut path = NodePath::from_root(self.root);
        let mut current = self.root;

        loop {
            let Some(node) = self.node(current) else {
                return (path, false);
            };
            // The root's construction visit stands for the search as a whole;
            // every descent records its own visit.
            node.record_visit();

            if node.is_terminal() {
                return (path, false);
            }

            if !node.is_fully_expanded() {
                let full = self.arenas.get(arena).map_or(true, |a| a.is_full());
                if full {
                    return (path, false);
                }
                if let Some(child) = self.expand(ctx, node, arena) {
                    path.push(child);
                    return (path, true);
                }
                if !node.is_fully_expanded() {
                    return (path, false);
                }
                // Another worker claimed the last action first; fall through to
                // selection among the published children.
            }

            match self.best_child(ctx, node) {
                Some(child) => {
                    path.push(child);
                    current = child;
                }
                None => return (path, false),
            }
        }
    }

    fn expand(&self, ctx: SearchContext<'_, G>, node: &SearchNode<G>, arena: usize) -> Option<NodeId> {
        let target = self.arenas.get(arena)?;
        if target.remain() == 0 {
            return None;
        }

        let action_index = node.claim_next_action()?;
        let action = node.actions().get(action_index)?;
        let state = ctx.rules.transition(node.state(), action);
        let child = SearchNode::new(ctx.rules, state, node.depth() + 1, ctx.config);
        let Some(slot) = target.construct(child) else {
            if !node.release_action(action_index) {
                log::warn!(
                    "Action {} at depth {} lost: arena {} refused its child",
                    action_index,
                    node.depth(),
                    arena
                );
            }
            return None;
        };

        let id = NodeId { arena, slot };
        node.publish_child(action_index, id);
        Some(id)
    }

    fn best_child(&self, ctx: SearchContext<'_, G>, node: &SearchNode<G>) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for (_, id) in node.children() {
            let Some(child) = self.node(id) else {
                continue;
            };
            let score = ctx.tree_policy.score(node, child);
            match best {
                Some((_, best_score)) if score <= best_score || score.is_nan() => {}
                _ => best = Some((id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    fn backpropagate(&self, ctx: SearchContext<'_, G>, path: &NodePath, outcome: &G::Outcome) {
        for id in path.ids.iter().rev() {
            if let Some(node) = self.node(*id) {
                if ctx.rules.should_credit_reward(node.state(), outcome) {
                    node.record_win();
                }
            }
        }
    }
}

/// Plays the default policy from `state` until the game ends
///
/// The rollout also ends when `max_rollout_depth` moves have been played or a
/// non-terminal state offers no actions; the state is then scored with the
/// no-winner sentinel.
pub fn simulate<G: GameRules>(
    ctx: SearchContext<'_, G>,
    state: &G::State,
    rng: &mut dyn RngCore,
) -> G::Outcome {
    let sentinel = ctx.config.no_winner_sentinel;
    let mut current = state.clone();

    for _ in 0..ctx.config.max_rollout_depth {
        let winner = ctx.rules.determine_winner(&current);
        if winner != sentinel {
            return ctx.rules.state_to_outcome(&current, winner);
        }

        let actions = ctx.rules.enumerate_actions(&current);
        if actions.is_empty() {
            if ctx.config.contract_checks {
                log::warn!("rollout reached a non-terminal state with no actions: {:?}", current);
            }
            return ctx.rules.state_to_outcome(&current, sentinel);
        }

        let index = ctx.default_policy.choose(&current, &actions, rng);
        let action = actions.get(index).unwrap_or(&actions[0]);
        current = ctx.rules.transition(&current, action);
    }

    let winner = ctx.rules.determine_winner(&current);
    if winner == sentinel && ctx.config.contract_checks {
        log::warn!(
            "rollout exceeded {} moves without reaching a terminal state",
            ctx.config.max_rollout_depth
        );
    }
    ctx.rules.state_to_outcome(&current, winner)
}
