//! Parallel search drivers
//!
//! Both drivers spawn one scoped OS thread per configured worker for the
//! duration of a single search and join them before returning.
//!
//! - Tree parallelization: all workers descend and grow the *same* tree.
//!   Each worker allocates new nodes only from its own arena; visit and win
//!   counters on shared nodes are relaxed atomics, so workers see each
//!   other's statistics with no ordering guarantees and without locking.
//! - Root parallelization: every worker searches its own tree built from a
//!   copy of the root state. Nothing is shared during the run; the root
//!   children's statistics are summed per action afterwards.

use std::thread;
use std::time::Instant;

use crate::{
    arena::Arena,
    game_rules::GameRules,
    mcts::{run_worker, worker_rng, Prepared},
    stats::{ChildStats, WorkerReport},
    tree::{SearchNode, SearchTree},
    MCTSError, Result, MCTS,
};

/// Sums per-tree root child statistics action by action
///
/// Every inner slice is indexed by action position, as returned by
/// [`SearchTree::root_child_stats`]. The result has one entry per action of
/// the longest input.
pub fn merge_child_stats(per_tree: &[Vec<ChildStats>]) -> Vec<ChildStats> {
    let width = per_tree.iter().map(Vec::len).max().unwrap_or(0);
    let mut merged: Vec<ChildStats> = (0..width)
        .map(|action_index| ChildStats {
            action_index,
            ..ChildStats::default()
        })
        .collect();

    for tree in per_tree {
        for child in tree {
            if let Some(total) = merged.get_mut(child.action_index) {
                total.visits += child.visits;
                total.wins += child.wins;
            }
        }
    }

    merged
}

impl<G: GameRules, A: Arena<SearchNode<G>>> MCTS<G, A> {
    /// Searches one tree shared by `thread_count` workers
    ///
    /// The root is allocated in worker 0's arena and constructed once, so
    /// after the join its visit count is exactly one more than the sum of all
    /// workers' iterations.
    pub fn search_tree_parallel(&mut self) -> Result<G::Action> {
        let config = self.config.validate()?;
        let actions = match self.prepare_search(&config)? {
            Prepared::Decided(action) => return Ok(action),
            Prepared::Search(actions) => actions,
        };

        let workers = config.thread_count;
        let arenas = self.take_arenas(workers, config.max_nodes_per_thread);
        let start = Instant::now();
        let ctx = self.context(&config);
        let tree = SearchTree::new(ctx, self.root_state.clone(), arenas)?;

        let reports = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let tree = &tree;
                    let config = &config;
                    scope.spawn(move || {
                        let mut rng = worker_rng(config, worker);
                        run_worker(tree, ctx, worker, &mut rng, start)
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| handle.join().map_err(|_| MCTSError::WorkerPanicked(worker)))
                .collect::<Result<Vec<WorkerReport>>>()
        })?;

        self.statistics.total_time = start.elapsed();
        self.statistics.record_workers(&reports);
        self.statistics.tree_size = tree.node_count();
        self.statistics.root_children = tree.root_child_stats();
        self.tree = Some(tree);

        self.finish_search(&actions)
    }

    /// Searches `thread_count` independent trees and merges their root
    /// statistics
    ///
    /// Root selection sees the merged statistics; the per-tree statistics are
    /// kept in [`SearchStatistics::per_tree_root_children`](crate::SearchStatistics::per_tree_root_children).
    /// The trees themselves are discarded and their arenas pooled.
    pub fn search_root_parallel(&mut self) -> Result<G::Action> {
        let config = self.config.validate()?;
        let actions = match self.prepare_search(&config)? {
            Prepared::Decided(action) => return Ok(action),
            Prepared::Search(actions) => actions,
        };

        let workers = config.thread_count;
        let arenas = self.take_arenas(workers, config.max_nodes_per_thread);
        let start = Instant::now();
        let ctx = self.context(&config);
        let root_state = &self.root_state;

        let results = thread::scope(|scope| {
            let handles: Vec<_> = arenas
                .into_iter()
                .enumerate()
                .map(|(worker, arena)| {
                    let config = &config;
                    scope.spawn(move || -> Result<TreeRun<A>> {
                        let tree = SearchTree::new(ctx, root_state.clone(), vec![arena])?;
                        let mut rng = worker_rng(config, worker);
                        let report = run_worker(&tree, ctx, 0, &mut rng, start);
                        Ok(TreeRun {
                            report,
                            node_count: tree.node_count(),
                            root_children: tree.root_child_stats(),
                            arenas: tree.into_arenas(),
                        })
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| {
                    handle
                        .join()
                        .map_err(|_| MCTSError::WorkerPanicked(worker))
                        .and_then(|run| run)
                })
                .collect::<Vec<Result<TreeRun<A>>>>()
        });

        let mut reports = Vec::with_capacity(workers);
        let mut per_tree = Vec::with_capacity(workers);
        let mut node_count = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(run) => {
                    reports.push(run.report);
                    per_tree.push(run.root_children);
                    node_count += run.node_count;
                    self.return_arenas(run.arenas);
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        self.statistics.total_time = start.elapsed();
        self.statistics.record_workers(&reports);
        self.statistics.tree_size = node_count;
        self.statistics.root_children = merge_child_stats(&per_tree);
        self.statistics.per_tree_root_children = per_tree;

        self.finish_search(&actions)
    }
}

/// What one root-parallel worker hands back to the merge step
struct TreeRun<A> {
    report: WorkerReport,
    node_count: usize,
    root_children: Vec<ChildStats>,
    arenas: Vec<A>,
}
