//! Root selection policies
//!
//! After the search budget is spent, a root selection policy picks the action
//! to play from the statistics of the root's children. Policies see plain
//! [`ChildStats`], so they work the same on a single tree and on the merged
//! statistics of a root-parallel search.

use crate::{config::BestChildCriteria, stats::ChildStats};

/// Trait for policies that choose the final action
pub trait RootSelection: Send + Sync {
    /// Returns the `action_index` of the chosen child, or `None` if `children`
    /// is empty
    fn select(&self, children: &[ChildStats]) -> Option<usize>;
}

impl RootSelection for BestChildCriteria {
    fn select(&self, children: &[ChildStats]) -> Option<usize> {
        let mut best: Option<&ChildStats> = None;

        for child in children {
            let better = match (self, best) {
                (_, None) => true,
                (BestChildCriteria::MostVisits, Some(current)) => child.visits > current.visits,
                (BestChildCriteria::HighestValue, Some(current)) => {
                    child.win_rate() > current.win_rate()
                }
            };
            if better {
                best = Some(child);
            }
        }

        best.map(|child| child.action_index)
    }
}

impl<F> RootSelection for F
where
    F: Fn(&[ChildStats]) -> Option<usize> + Send + Sync,
{
    fn select(&self, children: &[ChildStats]) -> Option<usize> {
        self(children)
    }
}
