//! Statistics collection for MCTS searches
//!
//! This module provides structures for collecting and reporting statistics
//! about MCTS search processes.

use std::time::Duration;

/// Visit and win counts of one root child, keyed by action position
///
/// Root selection policies operate on slices of these so that the same policy
/// can judge a single tree and the merged statistics of a root-parallel search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildStats {
    /// Position of the action in the root's action list
    pub action_index: usize,

    /// Number of iterations that passed through the child
    pub visits: u64,

    /// Number of those iterations credited as wins to the child
    pub wins: u64,
}

impl ChildStats {
    /// Returns the fraction of visits credited as wins
    pub fn win_rate(&self) -> f64 {
        crate::utils::win_rate(self.wins, self.visits)
    }
}

/// Why a worker (or the whole search) stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The per-worker iteration budget was used up
    #[default]
    IterationLimit,

    /// The wall-clock budget ran out
    Timeout,

    /// The worker's arena had no free slot left
    ArenaFull,

    /// The root had a single legal action, so no search was needed
    SingleAction,
}

/// Summary of one worker's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerReport {
    /// Iterations completed by the worker
    pub iterations: usize,

    /// Deepest node the worker reached
    pub max_depth: usize,

    /// Why the worker stopped
    pub stop_reason: StopReason,
}

/// Statistics collected during an MCTS search
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    /// Number of iterations performed, summed over workers
    pub iterations: usize,

    /// Iterations performed by each worker, in worker order
    pub iterations_per_worker: Vec<usize>,

    /// Total time spent searching
    pub total_time: Duration,

    /// Number of nodes allocated, summed over all arenas
    pub tree_size: usize,

    /// Maximum depth reached in the tree
    pub max_depth: usize,

    /// Whether any worker stopped before using its iteration budget
    pub stopped_early: bool,

    /// Why the search stopped; the first non-budget reason any worker hit
    pub stop_reason: StopReason,

    /// Root child statistics that root selection was applied to
    ///
    /// For root-parallel searches these are the merged statistics.
    pub root_children: Vec<ChildStats>,

    /// Root child statistics of each independent tree (root-parallel only)
    pub per_tree_root_children: Vec<Vec<ChildStats>>,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        SearchStatistics {
            iterations: 0,
            iterations_per_worker: Vec::new(),
            total_time: Duration::from_secs(0),
            tree_size: 0,
            max_depth: 0,
            stopped_early: false,
            stop_reason: StopReason::IterationLimit,
            root_children: Vec::new(),
            per_tree_root_children: Vec::new(),
        }
    }

    /// Folds the reports of all workers into the totals
    pub(crate) fn record_workers(&mut self, reports: &[WorkerReport]) {
        self.iterations_per_worker = reports.iter().map(|r| r.iterations).collect();
        self.iterations = self.iterations_per_worker.iter().sum();
        self.max_depth = reports.iter().map(|r| r.max_depth).max().unwrap_or(0);
        self.stop_reason = reports
            .iter()
            .map(|r| r.stop_reason)
            .find(|reason| *reason != StopReason::IterationLimit)
            .unwrap_or(StopReason::IterationLimit);
        self.stopped_early = self.stop_reason != StopReason::IterationLimit;
    }

    /// Returns the average time per iteration in microseconds
    pub fn avg_time_per_iteration_us(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.iterations as f64
    }

    /// Returns the number of iterations per second
    pub fn iterations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.iterations as f64 / self.total_time.as_secs_f64()
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "MCTS Search Statistics:\n\
             - Iterations: {} ({} workers)\n\
             - Total time: {:.3} seconds\n\
             - Tree size: {} nodes\n\
             - Max depth: {}\n\
             - Avg time per iteration: {:.3} µs\n\
             - Iterations per second: {:.1}\n\
             - Stop reason: {:?}",
            self.iterations,
            self.iterations_per_worker.len(),
            self.total_time.as_secs_f64(),
            self.tree_size,
            self.max_depth,
            self.avg_time_per_iteration_us(),
            self.iterations_per_second(),
            self.stop_reason
        )
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
