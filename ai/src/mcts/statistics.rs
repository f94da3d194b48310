use std::fmt;
use std::time::Duration;
use crate::game::Game;
use crate::mcts::transposition::StateKey;
use crate::mcts::tree::SearchTree;

/// Counters for one completed search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchStats {
    pub iterations: u32,
    pub failed_iterations: u32,
    pub tree_actions: usize,
    pub rollout_actions: usize,
    pub elapsed: Duration,
    /// Graph search only: keys dropped by the prune that preceded this search.
    pub pruned_keys: Vec<StateKey>,
}

impl SearchStats {
    pub fn completed_iterations(&self) -> u32 {
        self.iterations - self.failed_iterations
    }
}

/// Shape of a search tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeStatistics {
    pub total_nodes: usize,
    pub leaves: usize,
    pub max_depth: u32,
    pub nodes_at_depth: Vec<usize>,
    pub root_visits: u32,
}

impl TreeStatistics {
    pub fn new<G: Game>(tree: &SearchTree<G>) -> Self {
        let mut stats = TreeStatistics {
            root_visits: tree.node(tree.root()).visits(),
            ..Default::default()
        };

        for id in tree.node_ids() {
            let node = tree.node(id);
            stats.total_nodes += 1;
            if node.is_leaf() {
                stats.leaves += 1;
            }

            let depth = node.depth() as usize;
            if stats.nodes_at_depth.len() <= depth {
                stats.nodes_at_depth.resize(depth + 1, 0);
            }
            stats.nodes_at_depth[depth] += 1;
            stats.max_depth = stats.max_depth.max(node.depth());
        }
        stats
    }
}

impl fmt::Display for TreeStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} leaves), depth {}, root visits {}, per depth {:?}",
            self.total_nodes, self.leaves, self.max_depth, self.root_visits, self.nodes_at_depth
        )
    }
}
