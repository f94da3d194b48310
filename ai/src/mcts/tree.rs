use std::collections::HashSet;
use std::rc::Rc;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::Bfs;
use crate::config::{Information, MctsParams, OmaMode};
use crate::game::Game;
use crate::heuristics::ActionHeuristic;
use crate::mcts::math;
use crate::mcts::node::{NodeId, OmaLink, TreeNode};
use crate::mcts::stats::{ActionStats, RewardRange};
use crate::mcts::transposition::TranspositionTable;

/// Arena of search nodes. Edges run from a node to the children it expanded.
pub struct SearchTree<G: Game> {
    pub(crate) graph: StableGraph<TreeNode<G>, G::Action>,
    pub(crate) root: NodeId,
    pub(crate) params: MctsParams,
    pub(crate) action_heuristic: Option<Rc<dyn ActionHeuristic<G>>>,
    pub(crate) num_players: usize,
    /// The player the search is run for.
    pub(crate) root_player: usize,
    pub(crate) reward_range: RewardRange,
    /// Present only for graph search.
    pub(crate) table: Option<TranspositionTable>,
}

impl<G: Game> SearchTree<G> {
    pub fn new(state: &G, params: MctsParams) -> Self {
        let mut graph = StableGraph::new();

        let mut root = TreeNode::new(state.current_player(), 0, None, None);
        root.state = Some(state.clone());
        root.terminal = state.is_terminal();
        let root = graph.add_node(root);

        SearchTree {
            graph,
            root,
            params,
            action_heuristic: None,
            num_players: state.num_players(),
            root_player: state.current_player(),
            reward_range: RewardRange::default(),
            table: None,
        }
    }

    pub fn with_action_heuristic(mut self, heuristic: Rc<dyn ActionHeuristic<G>>) -> Self {
        self.action_heuristic = Some(heuristic);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_player(&self) -> usize {
        self.root_player
    }

    pub fn params(&self) -> &MctsParams {
        &self.params
    }

    pub fn reward_range(&self) -> RewardRange {
        self.reward_range
    }

    pub fn node(&self, id: NodeId) -> &TreeNode<G> {
        &self.graph[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode<G> {
        &mut self.graph[id]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn transposition_table(&self) -> Option<&TranspositionTable> {
        self.table.as_ref()
    }

    /// Every node reachable from `id`, breadth first, `id` included.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut bfs = Bfs::new(&self.graph, id);
        while let Some(next) = bfs.next(&self.graph) {
            nodes.push(next);
        }
        nodes
    }

    /// Creates the child reached from `parent` via `action` with `player` to move.
    pub fn add_child(&mut self, parent: NodeId, action: &G::Action, player: usize, state: &G) -> NodeId {
        let depth = self.graph[parent].depth + 1;

        let mut node = TreeNode::new(player, depth, Some(parent), Some(action.clone()));
        node.terminal = state.is_terminal();
        if self.params.information == Information::ClosedLoop {
            node.state = Some(state.clone());
        }
        node.oma = self.oma_link(parent, action, player);

        let child = self.graph.add_node(node);
        self.link_child(parent, action, player, child);
        child
    }

    /// Records `child` as the `player` slot of `action` at `parent`.
    pub(crate) fn link_child(&mut self, parent: NodeId, action: &G::Action, player: usize, child: NodeId) {
        let num_players = self.num_players;
        let slots = self.graph[parent]
            .children
            .entry(action.clone())
            .or_insert_with(|| vec![None; num_players]);
        slots[player] = Some(child);

        if self.graph.find_edge(parent, child).is_none() {
            self.graph.add_edge(parent, child, action.clone());
        }
    }

    fn oma_link(&self, parent: NodeId, action: &G::Action, player: usize) -> Option<OmaLink<G::Action>> {
        match self.params.oma {
            OmaMode::Off => return None,
            OmaMode::SearchPlayer if player != self.root_player => return None,
            _ => {}
        }

        let mut opponent_actions = Vec::new();
        let mut current = parent;
        let mut action_taken = action.clone();
        loop {
            let node = &self.graph[current];
            if node.decision_player == player {
                opponent_actions.reverse();
                return Some(OmaLink { parent: current, parent_action: action_taken, opponent_actions });
            }
            opponent_actions.push(action_taken);
            action_taken = node.action_to_reach.clone()?;
            current = node.parent?;
        }
    }

    /// Refreshes a node on entry with the state it is entered with.
    ///
    /// Legal actions are only recorded when the node's own player is to move; a node
    /// entered with someone else to move (a shared graph key) is treated as a leaf.
    pub fn prepare(&mut self, id: NodeId, state: &G) {
        let params = &self.params;
        let num_players = self.num_players;
        let heuristic = self.action_heuristic.clone();
        let node = &mut self.graph[id];

        node.terminal = state.is_terminal();
        if node.terminal || state.current_player() != node.decision_player {
            node.available.clear();
            return;
        }

        let mut actions = state.actions();

        if let Some(heuristic) = &heuristic {
            let recalculate = node.heuristic_values.is_empty()
                || (params.action_heuristic_recalculation > 0 && node.visits % params.action_heuristic_recalculation == 0);
            for action in actions.iter() {
                if recalculate || !node.heuristic_values.contains_key(action) {
                    let value = heuristic.evaluate(action, state, &actions);
                    node.heuristic_values.insert(action.clone(), value);
                }
            }

            if params.puct {
                let values: Vec<f64> = actions.iter().map(|a| node.heuristic_values[a]).collect();
                let weights = if params.puct_temperature > 0.0 {
                    math::softmax(&values, params.puct_temperature)
                } else {
                    let clamped: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
                    math::pdf(&clamped).unwrap_or_else(|| vec![1.0 / actions.len() as f64; actions.len()])
                };
                node.puct_weights = actions.iter().cloned().zip(weights).collect();
            }

            if params.progressive_widening() {
                // stable, so ties keep the order the game listed them in
                actions.sort_by(|a, b| node.heuristic_values[b].total_cmp(&node.heuristic_values[a]));
            }
        }

        for action in actions.iter() {
            if node.action_values.contains_key(action) {
                continue;
            }
            let mut stats = ActionStats::new(num_players);
            if params.initialise_visits > 0 {
                let value = node.heuristic_values.get(action).copied().unwrap_or(0.0);
                stats.seed(node.decision_player, value, params.initialise_visits, params.paranoid);
                node.visits += params.initialise_visits;
            }
            node.action_values.insert(action.clone(), stats);
            node.children.entry(action.clone()).or_insert_with(|| vec![None; num_players]);
        }

        node.available = actions;
    }

    /// Follows real actions observed since the last search down from the root and, when the
    /// node reached belongs to the player now to move, makes it the new root.
    pub fn advance_root(&mut self, observed: &[(usize, G::Action)], state: &G) -> bool {
        let mut node = self.root;
        for (i, (_, action)) in observed.iter().enumerate() {
            let next_player = observed.get(i + 1).map_or(state.current_player(), |(player, _)| *player);
            match self.graph[node].child(action, next_player) {
                Some(child) => node = child,
                None => return false,
            }
        }

        if self.graph[node].decision_player != state.current_player() {
            return false;
        }
        self.rootify(node, state);
        true
    }

    /// Makes `id` the root: everything outside its subtree is dropped and depths are rebased.
    pub fn rootify(&mut self, id: NodeId, state: &G) {
        let keep: HashSet<NodeId> = self.subtree(id).into_iter().collect();
        let doomed: Vec<NodeId> = self.graph.node_indices().filter(|n| !keep.contains(n)).collect();
        for node in doomed {
            self.graph.remove_node(node);
        }

        let base = self.graph[id].depth;
        for node in keep.iter() {
            let node = &mut self.graph[*node];
            node.depth -= base;
            if node.oma.as_ref().is_some_and(|link| !keep.contains(&link.parent)) {
                node.oma = None;
            }
        }

        let root = &mut self.graph[id];
        root.parent = None;
        root.action_to_reach = None;
        root.oma = None;
        root.state = Some(state.clone());

        self.root = id;
        self.root_player = state.current_player();
    }

    /// Removes nodes and clears every child slot that pointed at them.
    pub(crate) fn remove_nodes(&mut self, ids: &[NodeId]) {
        let removed: HashSet<NodeId> = ids.iter().copied().collect();
        for id in ids {
            self.graph.remove_node(*id);
        }

        let remaining: Vec<NodeId> = self.graph.node_indices().collect();
        for id in remaining {
            let node = &mut self.graph[id];
            for slots in node.children.values_mut() {
                for slot in slots.iter_mut() {
                    if slot.is_some_and(|child| removed.contains(&child)) {
                        *slot = None;
                    }
                }
            }
            if node.parent.is_some_and(|parent| removed.contains(&parent)) {
                node.parent = None;
            }
        }
    }
}
