use crate::game::Game;
use crate::mcts::node::{NodeId, OmaStats, TreeNode};
use crate::mcts::tree::SearchTree;

impl<G: Game> SearchTree<G> {
    /// Pooled statistics for `action` taken at `id`, shared with every node under the same OMA parent.
    pub fn pooled_stats(&self, id: NodeId, action: &G::Action) -> Option<&OmaStats> {
        let link = self.graph[id].oma.as_ref()?;
        self.graph[link.parent].oma_stats(&link.parent_action, action)
    }

    /// Mixes `value` with the pooled mean, trusting the pool less as the action's own visits grow.
    pub(crate) fn oma_blend(&self, node: &TreeNode<G>, action: &G::Action, n_visits: u32, value: f64) -> f64 {
        let prior = self.params.oma_visits as f64;
        if prior <= 0.0 {
            return value;
        }
        let Some(link) = node.oma.as_ref() else {
            return value;
        };
        let Some(pooled) = self.graph[link.parent]
            .oma_stats(&link.parent_action, action)
            .filter(|s| s.n_visits > 0)
        else {
            return value;
        };

        let beta = (prior / (prior + 3.0 * n_visits as f64)).sqrt();
        (1.0 - beta) * value + beta * pooled.mean()
    }

    /// Nodes whose nearest same-player ancestor is `parent` and that reached it via `parent_action`.
    pub fn oma_children(&self, parent: NodeId, parent_action: &G::Action) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|id| {
                self.graph[*id]
                    .oma
                    .as_ref()
                    .is_some_and(|link| link.parent == parent && link.parent_action == *parent_action)
            })
            .collect()
    }
}
