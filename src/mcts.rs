//! Main implementation of the Monte Carlo Tree Search algorithm
//!
//! This module contains the [`MCTS`] engine, the worker loop shared by every
//! driver, and the single-threaded driver. The parallel drivers live in
//! [`parallel`](crate::parallel).

use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    arena::{Arena, LinearArena},
    config::{MCTSConfig, SearchStrategy},
    game_rules::GameRules,
    policy::{DefaultPolicy, RandomPolicy, RootSelection, TreePolicy, UCB1Policy},
    snapshot::NodeSnapshot,
    stats::{ChildStats, SearchStatistics, StopReason, WorkerReport},
    tree::{SearchContext, SearchNode, SearchTree},
    MCTSError, Result,
};

/// Golden-ratio increment used to spread worker seeds apart
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// The main Monte Carlo Tree Search engine
///
/// The engine holds the game rules, the root state, the pluggable policies and
/// the configuration. Each call to [`search`](MCTS::search) builds a fresh tree
/// in arenas of type `A` and returns the chosen action.
///
/// The tree of the most recent single-threaded or tree-parallel search is kept
/// for inspection until the next search or [`recycle_tree`](MCTS::recycle_tree).
pub struct MCTS<G: GameRules, A: Arena<SearchNode<G>> = LinearArena<SearchNode<G>>> {
    /// Game semantics
    pub(crate) rules: G,

    /// State the search starts from
    pub(crate) root_state: G::State,

    /// Configuration for the search
    pub(crate) config: MCTSConfig,

    /// Statistics gathered during the last search
    pub(crate) statistics: SearchStatistics,

    /// Policy for scoring children during selection
    tree_policy: Box<dyn TreePolicy<G>>,

    /// Policy for choosing rollout moves
    default_policy: Box<dyn DefaultPolicy<G>>,

    /// Policy for choosing the final action
    root_selection: Box<dyn RootSelection>,

    /// Tree built by the last search
    pub(crate) tree: Option<SearchTree<G, A>>,

    /// Flushed arenas waiting to be reused
    pub(crate) arena_pool: Vec<A>,
}

impl<G: GameRules> MCTS<G> {
    /// Creates a new engine for `rules` starting from `root_state`
    ///
    /// Nodes are allocated from [`LinearArena`]s. The tree policy is UCB1 with
    /// the configured exploration constant, the default policy plays uniformly
    /// at random, and the root selection follows the configured best-child
    /// criteria.
    pub fn new(rules: G, root_state: G::State, config: MCTSConfig) -> Self {
        Self::with_arena(rules, root_state, config)
    }
}

impl<G: GameRules, A: Arena<SearchNode<G>>> MCTS<G, A> {
    /// Creates a new engine whose nodes are allocated from arenas of type `A`
    ///
    /// # Example
    ///
    /// ```
    /// use arena_mcts::{AgentIndex, GameRules, MCTSConfig, SearchNode, StackArena, MCTS};
    ///
    /// # struct Nim;
    /// # #[derive(Clone, Debug)]
    /// # struct Heap {
    /// #     stones: u8,
    /// #     to_move: AgentIndex,
    /// # }
    /// # impl GameRules for Nim {
    /// #     type State = Heap;
    /// #     type Action = u8;
    /// #     type Outcome = AgentIndex;
    /// #     fn transition(&self, state: &Heap, take: &u8) -> Heap {
    /// #         Heap { stones: state.stones - take, to_move: 3 - state.to_move }
    /// #     }
    /// #     fn enumerate_actions(&self, state: &Heap) -> Vec<u8> {
    /// #         (1..=state.stones.min(2)).collect()
    /// #     }
    /// #     fn determine_winner(&self, state: &Heap) -> AgentIndex {
    /// #         if state.stones == 0 { 3 - state.to_move } else { 0 }
    /// #     }
    /// #     fn state_to_outcome(&self, _state: &Heap, winner: AgentIndex) -> AgentIndex {
    /// #         winner
    /// #     }
    /// #     fn should_credit_reward(&self, observer: &Heap, winner: &AgentIndex) -> bool {
    /// #         *winner == 3 - observer.to_move
    /// #     }
    /// # }
    /// let config = MCTSConfig::default()
    ///     .with_max_iterations_per_thread(2_000)
    ///     .with_seed(42);
    /// let mut mcts: MCTS<Nim, StackArena<SearchNode<Nim>>> =
    ///     MCTS::with_arena(Nim, Heap { stones: 4, to_move: 1 }, config);
    ///
    /// assert_eq!(mcts.search().unwrap(), 1);
    /// ```
    pub fn with_arena(rules: G, root_state: G::State, config: MCTSConfig) -> Self {
        let tree_policy: Box<dyn TreePolicy<G>> =
            Box::new(UCB1Policy::new(config.exploration_constant));
        let default_policy: Box<dyn DefaultPolicy<G>> = Box::new(RandomPolicy::new());
        let root_selection: Box<dyn RootSelection> = Box::new(config.best_child_criteria);

        MCTS {
            rules,
            root_state,
            config,
            statistics: SearchStatistics::new(),
            tree_policy,
            default_policy,
            root_selection,
            tree: None,
            arena_pool: Vec::new(),
        }
    }

    /// Sets the tree policy to use
    pub fn with_tree_policy<P: TreePolicy<G> + 'static>(mut self, policy: P) -> Self {
        self.tree_policy = Box::new(policy);
        self
    }

    /// Sets the default (rollout) policy to use
    pub fn with_default_policy<P: DefaultPolicy<G> + 'static>(mut self, policy: P) -> Self {
        self.default_policy = Box::new(policy);
        self
    }

    /// Sets the root selection policy to use
    pub fn with_root_selection<P: RootSelection + 'static>(mut self, policy: P) -> Self {
        self.root_selection = Box::new(policy);
        self
    }

    /// The game rules
    pub fn rules(&self) -> &G {
        &self.rules
    }

    /// The state searches start from
    pub fn root_state(&self) -> &G::State {
        &self.root_state
    }

    /// Replaces the root state, e.g. after a move has been played
    ///
    /// The previous tree is recycled.
    pub fn set_root_state(&mut self, state: G::State) {
        self.recycle_tree();
        self.root_state = state;
    }

    /// The configuration
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    /// Returns the search statistics
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// The tree built by the last single-threaded or tree-parallel search
    pub fn tree(&self) -> Option<&SearchTree<G, A>> {
        self.tree.as_ref()
    }

    /// Runs the configured search strategy and returns the best action
    pub fn search(&mut self) -> Result<G::Action> {
        match self.config.strategy {
            SearchStrategy::SingleThreaded => self.search_single_threaded(),
            SearchStrategy::TreeParallel => self.search_tree_parallel(),
            SearchStrategy::RootParallel => self.search_root_parallel(),
        }
    }

    /// Runs the configured strategy with a different per-worker iteration budget
    pub fn search_for_iterations(&mut self, iterations: usize) -> Result<G::Action> {
        let saved = self.config.max_iterations_per_thread;
        self.config.max_iterations_per_thread = iterations;
        let result = self.search();
        self.config.max_iterations_per_thread = saved;
        result
    }

    /// Runs the configured strategy for at most `duration`
    ///
    /// This is useful when you want to run a time-limited search without
    /// changing the configuration. The iteration budget still applies.
    pub fn search_for_time(&mut self, duration: Duration) -> Result<G::Action> {
        let saved = self.config.timeout.replace(duration);
        let result = self.search();
        self.config.timeout = saved;
        result
    }

    /// Searches one tree on the calling thread
    pub fn search_single_threaded(&mut self) -> Result<G::Action> {
        let config = self.config.validate()?;
        let actions = match self.prepare_search(&config)? {
            Prepared::Decided(action) => return Ok(action),
            Prepared::Search(actions) => actions,
        };

        let arenas = self.take_arenas(1, config.max_nodes_per_thread);
        let start = Instant::now();
        let ctx = self.context(&config);
        let tree = SearchTree::new(ctx, self.root_state.clone(), arenas)?;
        let mut rng = worker_rng(&config, 0);
        let report = run_worker(&tree, ctx, 0, &mut rng, start);

        self.statistics.total_time = start.elapsed();
        self.statistics.record_workers(&[report]);
        self.statistics.tree_size = tree.node_count();
        self.statistics.root_children = tree.root_child_stats();
        self.tree = Some(tree);

        self.finish_search(&actions)
    }

    /// Shared preamble of every driver
    ///
    /// Resets the statistics, recycles the previous tree and decides the
    /// trivial cases: no legal action is an error, a single legal action is
    /// returned without searching.
    pub(crate) fn prepare_search(&mut self, config: &MCTSConfig) -> Result<Prepared<G::Action>> {
        self.statistics = SearchStatistics::new();
        self.recycle_tree();

        if self.rules.determine_winner(&self.root_state) != config.no_winner_sentinel {
            return Err(MCTSError::NoLegalActions);
        }
        let mut actions = self.rules.enumerate_actions(&self.root_state);
        match actions.len() {
            0 => Err(MCTSError::NoLegalActions),
            1 => {
                log::debug!("single legal action at the root, skipping search");
                self.statistics.stop_reason = StopReason::SingleAction;
                Ok(Prepared::Decided(actions.remove(0)))
            }
            _ => Ok(Prepared::Search(actions)),
        }
    }

    /// Applies root selection to the recorded root statistics
    pub(crate) fn finish_search(&mut self, actions: &[G::Action]) -> Result<G::Action> {
        log::info!(
            "search finished: {} iterations, {} nodes, {:?} ({:.1} it/s)",
            self.statistics.iterations,
            self.statistics.tree_size,
            self.statistics.stop_reason,
            self.statistics.iterations_per_second()
        );

        let visited: Vec<ChildStats> = self
            .statistics
            .root_children
            .iter()
            .filter(|child| child.visits > 0)
            .copied()
            .collect();

        // Nothing was expanded (e.g. an arena with room for the root only):
        // fall back to the first legal action.
        let index = self.root_selection.select(&visited).unwrap_or(0);
        log::trace!("root selection picked action index {}", index);

        actions
            .get(index)
            .cloned()
            .ok_or(MCTSError::NoLegalActions)
    }

    pub(crate) fn context<'a>(&'a self, config: &'a MCTSConfig) -> SearchContext<'a, G> {
        SearchContext {
            rules: &self.rules,
            tree_policy: self.tree_policy.as_ref(),
            default_policy: self.default_policy.as_ref(),
            config,
        }
    }

    /// Hands out `count` empty arenas of the given capacity, reusing pooled
    /// ones where possible
    pub(crate) fn take_arenas(&mut self, count: usize, capacity: usize) -> Vec<A> {
        let mut arenas: Vec<A> = Vec::with_capacity(count);
        while arenas.len() < count {
            match self.arena_pool.pop() {
                Some(arena) if arena.capacity() == capacity => arenas.push(arena),
                Some(_) => {}
                None => arenas.push(A::with_capacity(capacity)),
            }
        }
        arenas
    }

    /// Returns flushed arenas to the pool
    pub(crate) fn return_arenas(&mut self, arenas: Vec<A>) {
        for mut arena in arenas {
            arena.flush();
            self.arena_pool.push(arena);
        }
    }

    /// Releases the current tree, keeping its arenas for the next search
    ///
    /// Reusing arenas avoids reserving the node buffers again when running
    /// many consecutive searches with the same capacity.
    pub fn recycle_tree(&mut self) {
        if let Some(tree) = self.tree.take() {
            self.return_arenas(tree.into_arenas());
        }
    }

    /// Returns a snapshot of the current tree, down to `max_depth` if given
    pub fn snapshot(&self, max_depth: Option<usize>) -> Option<NodeSnapshot> {
        self.tree.as_ref().map(|tree| NodeSnapshot::capture(tree, max_depth))
    }

    /// Returns a visualization of the search tree
    pub fn visualize_tree(&self) -> String {
        self.snapshot(None)
            .map(|snapshot| snapshot.render())
            .unwrap_or_default()
    }
}

/// Outcome of the shared search preamble
pub(crate) enum Prepared<Action> {
    /// The action is forced; no search is needed
    Decided(Action),

    /// The root's legal actions, in enumeration order
    Search(Vec<Action>),
}

/// Creates the random number generator of worker `worker`
///
/// Seeded configurations give every worker a distinct, reproducible stream.
pub(crate) fn worker_rng(config: &MCTSConfig, worker: usize) -> StdRng {
    match config.seed {
        Some(seed) => {
            StdRng::seed_from_u64(seed.wrapping_add(SEED_STRIDE.wrapping_mul(worker as u64)))
        }
        None => StdRng::from_entropy(),
    }
}

/// Runs iterations against `tree` until one of the budgets is exhausted
///
/// Budgets are checked once per iteration: the iteration count, the timeout
/// measured from `start`, and (with `halt_on_full_arena`) free space in the
/// worker's arena.
pub(crate) fn run_worker<G: GameRules, A: Arena<SearchNode<G>>>(
    tree: &SearchTree<G, A>,
    ctx: SearchContext<'_, G>,
    worker: usize,
    rng: &mut StdRng,
    start: Instant,
) -> WorkerReport {
    let config = ctx.config;
    let mut report = WorkerReport::default();

    while report.iterations < config.max_iterations_per_thread {
        if let Some(timeout) = config.timeout {
            if start.elapsed() >= timeout {
                report.stop_reason = StopReason::Timeout;
                break;
            }
        }
        if config.halt_on_full_arena && tree.arena(worker).map_or(true, |a| a.is_full()) {
            report.stop_reason = StopReason::ArenaFull;
            break;
        }

        let iteration = tree.iterate(ctx, worker, rng);
        report.max_depth = report.max_depth.max(iteration.depth);
        report.iterations += 1;
    }

    if report.stop_reason != StopReason::IterationLimit {
        log::debug!(
            "worker {} stopped early after {} iterations: {:?}",
            worker,
            report.iterations,
            report.stop_reason
        );
    } else {
        log::debug!("worker {} finished {} iterations", worker, report.iterations);
    }

    report
}
