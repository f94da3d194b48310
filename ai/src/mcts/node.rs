use std::collections::HashMap;
use petgraph::stable_graph::NodeIndex;
use crate::game::Game;
use crate::mcts::stats::ActionStats;
use crate::mcts::transposition::StateKey;

pub type NodeId = NodeIndex;

/// Link to the nearest strict ancestor owned by the same player.
#[derive(Clone, Debug, PartialEq)]
pub struct OmaLink<A> {
    pub parent: NodeId,
    /// The action the OMA parent took toward this node.
    pub parent_action: A,
    /// Actions taken by other players in between, oldest first.
    pub opponent_actions: Vec<A>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OmaStats {
    pub n_visits: u32,
    pub total_value: f64,
}

impl OmaStats {
    pub fn mean(&self) -> f64 {
        if self.n_visits == 0 { 0.0 } else { self.total_value / self.n_visits as f64 }
    }
}

/// One step of the in-tree part of an iteration.
#[derive(Clone, Debug)]
pub struct TrajectoryStep<A> {
    pub node: NodeId,
    pub action: A,
    /// Candidate set the action was chosen from.
    pub considered: Vec<A>,
}

pub struct TreeNode<G: Game> {
    pub(crate) visits: u32,
    pub(crate) decision_player: usize,
    pub(crate) depth: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) action_to_reach: Option<G::Action>,

    pub(crate) action_values: HashMap<G::Action, ActionStats>,
    /// One slot per player; in a self-only tree only the owner's slot is used.
    pub(crate) children: HashMap<G::Action, Vec<Option<NodeId>>>,

    /// Owned snapshot: always present on a root, and on every node in closed loop.
    pub(crate) state: Option<G>,
    pub(crate) terminal: bool,
    /// Legal actions the last time this node was entered with its player to move.
    pub(crate) available: Vec<G::Action>,

    pub(crate) heuristic_values: HashMap<G::Action, f64>,
    pub(crate) puct_weights: HashMap<G::Action, f64>,
    /// Accumulated regret-matching strategy.
    pub(crate) regret_average: HashMap<G::Action, f64>,

    pub(crate) oma: Option<OmaLink<G::Action>>,
    /// Pooled statistics keyed by (parent action, child action).
    pub(crate) oma_stats: HashMap<G::Action, HashMap<G::Action, OmaStats>>,

    pub(crate) key: Option<StateKey>,
}

impl<G: Game> TreeNode<G> {
    pub(crate) fn new(decision_player: usize, depth: u32, parent: Option<NodeId>, action_to_reach: Option<G::Action>) -> Self {
        TreeNode {
            visits: 0,
            decision_player,
            depth,
            parent,
            action_to_reach,
            action_values: HashMap::new(),
            children: HashMap::new(),
            state: None,
            terminal: false,
            available: Vec::new(),
            heuristic_values: HashMap::new(),
            puct_weights: HashMap::new(),
            regret_average: HashMap::new(),
            oma: None,
            oma_stats: HashMap::new(),
            key: None,
        }
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn decision_player(&self) -> usize {
        self.decision_player
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn action_to_reach(&self) -> Option<&G::Action> {
        self.action_to_reach.as_ref()
    }

    pub fn state(&self) -> Option<&G> {
        self.state.as_ref()
    }

    pub fn key(&self) -> Option<&StateKey> {
        self.key.as_ref()
    }

    pub fn available_actions(&self) -> &[G::Action] {
        &self.available
    }

    pub fn stats(&self, action: &G::Action) -> Option<&ActionStats> {
        self.action_values.get(action)
    }

    pub fn action_stats(&self) -> impl Iterator<Item = (&G::Action, &ActionStats)> {
        self.action_values.iter()
    }

    pub fn child(&self, action: &G::Action, player: usize) -> Option<NodeId> {
        self.children.get(action).and_then(|slots| slots.get(player).copied().flatten())
    }

    /// Any expanded child for `action`, whichever player it belongs to.
    pub fn any_child(&self, action: &G::Action) -> Option<NodeId> {
        self.children.get(action).and_then(|slots| slots.iter().flatten().next().copied())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().flat_map(|slots| slots.iter().flatten().copied())
    }

    pub fn oma_link(&self) -> Option<&OmaLink<G::Action>> {
        self.oma.as_ref()
    }

    pub fn oma_stats(&self, parent_action: &G::Action, child_action: &G::Action) -> Option<&OmaStats> {
        self.oma_stats.get(parent_action).and_then(|m| m.get(child_action))
    }

    pub fn oma_entries(&self) -> impl Iterator<Item = (&G::Action, &G::Action, &OmaStats)> {
        self.oma_stats
            .iter()
            .flat_map(|(pa, m)| m.iter().map(move |(ca, s)| (pa, ca, s)))
    }

    pub fn regret_strategy(&self) -> &HashMap<G::Action, f64> {
        &self.regret_average
    }

    /// Mean value of `player` over all visits, used as the regret baseline.
    pub fn node_value(&self, player: usize) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        let total: f64 = self.action_values.values().map(|s| s.total_value[player]).sum();
        total / self.visits as f64
    }

    /// Sum of per-action visits. Seeded visits count on both sides, so this always equals `visits`.
    pub fn action_visit_total(&self) -> u32 {
        self.action_values.values().map(|s| s.n_visits).sum()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }
}
