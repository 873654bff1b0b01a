//! Point-in-time copies of search trees for diagnostics
//!
//! A [`NodeSnapshot`] is a plain, owned tree of node statistics that can be
//! rendered as text or, with the `serde` feature, handed to any serializer.

use std::fmt::Write;

use crate::{
    arena::Arena,
    game_rules::GameRules,
    tree::{NodeId, SearchNode, SearchTree},
};

/// Statistics of one node and its descendants
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    /// The action that led here, rendered with `Debug` (`None` for the root)
    pub action: Option<String>,

    /// The node's state, rendered with `Debug`
    pub state: String,

    /// Depth of the node in the tree (root = 0)
    pub depth: usize,

    /// Visit count
    pub visits: u64,

    /// Win count
    pub wins: u64,

    /// Whether the node's state has a winner
    pub terminal: bool,

    /// Snapshots of the expanded children, in action order
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Copies the statistics of `tree`, stopping below `max_depth` if given
    pub fn capture<G: GameRules, A: Arena<SearchNode<G>>>(
        tree: &SearchTree<G, A>,
        max_depth: Option<usize>,
    ) -> NodeSnapshot {
        capture_node(tree, tree.root_id(), None, max_depth)
    }

    /// Total number of nodes in the snapshot
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::node_count).sum::<usize>()
    }

    /// Renders the snapshot as an indented outline, one node per line
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.render_into(&mut output);
        output
    }

    fn render_into(&self, output: &mut String) {
        let indent = "  ".repeat(self.depth);
        let action = self.action.as_deref().unwrap_or("Root");
        let _ = writeln!(
            output,
            "{}{} (visits: {}, wins: {}, win rate: {:.3})",
            indent,
            action,
            self.visits,
            self.wins,
            crate::utils::win_rate(self.wins, self.visits)
        );
        for child in &self.children {
            child.render_into(output);
        }
    }
}

fn capture_node<G: GameRules, A: Arena<SearchNode<G>>>(
    tree: &SearchTree<G, A>,
    id: NodeId,
    action: Option<String>,
    max_depth: Option<usize>,
) -> NodeSnapshot {
    let Some(node) = tree.node(id) else {
        return NodeSnapshot {
            action,
            state: String::new(),
            depth: 0,
            visits: 0,
            wins: 0,
            terminal: false,
            children: Vec::new(),
        };
    };

    let descend = max_depth.map_or(true, |limit| node.depth() < limit);
    let children = if descend {
        node.children()
            .map(|(index, child)| {
                let action = node.actions().get(index).map(|a| format!("{:?}", a));
                capture_node(tree, child, action, max_depth)
            })
            .collect()
    } else {
        Vec::new()
    };

    NodeSnapshot {
        action,
        state: format!("{:?}", node.state()),
        depth: node.depth(),
        visits: node.visits(),
        wins: node.wins(),
        terminal: node.is_terminal(),
        children,
    }
}
