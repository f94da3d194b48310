use std::collections::{HashMap, HashSet, VecDeque};
use log::debug;
use crate::config::{MctsParams, Structure};
use crate::game::Game;
use crate::mcts::node::{NodeId, TreeNode};
use crate::mcts::tree::SearchTree;

/// Abstracts a raw game state into the identity used by graph search.
pub trait KeyFunction<G: Game> {
    fn key(&self, state: &G) -> String;
}

impl<G: Game, F> KeyFunction<G> for F
where
    F: Fn(&G) -> String,
{
    fn key(&self, state: &G) -> String {
        self(state)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Set only for self-only keys, so different players can never share a node.
    pub player: Option<usize>,
    pub repr: String,
}

impl StateKey {
    pub fn new<G: Game, K: KeyFunction<G> + ?Sized>(state: &G, key_fn: &K, self_only: bool) -> Self {
        StateKey {
            player: self_only.then(|| state.current_player()),
            repr: key_fn.key(state),
        }
    }
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    nodes: HashMap<StateKey, NodeId>,
    /// Keys reached since the last prune.
    touched: HashSet<StateKey>,
}

impl TranspositionTable {
    pub fn get(&self, key: &StateKey) -> Option<NodeId> {
        self.nodes.get(key).copied()
    }

    pub fn insert(&mut self, key: StateKey, node: NodeId) {
        self.touched.insert(key.clone());
        self.nodes.insert(key, node);
    }

    pub fn touch(&mut self, key: &StateKey) {
        if !self.touched.contains(key) {
            self.touched.insert(key.clone());
        }
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn remove(&mut self, key: &StateKey) -> Option<NodeId> {
        self.touched.remove(key);
        self.nodes.remove(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.nodes.keys()
    }

    /// Drops every entry not touched since the last prune and returns what was dropped.
    pub fn prune(&mut self) -> Vec<(StateKey, NodeId)> {
        let touched = std::mem::take(&mut self.touched);

        let stale: Vec<StateKey> = self.nodes.keys().filter(|k| !touched.contains(*k)).cloned().collect();
        stale
            .into_iter()
            .filter_map(|k| self.nodes.remove(&k).map(|node| (k, node)))
            .collect()
    }
}

impl<G: Game> SearchTree<G> {
    /// A search graph whose root is registered under the key of `state`.
    pub fn new_graph<K: KeyFunction<G> + ?Sized>(state: &G, params: MctsParams, key_fn: &K) -> Self {
        let key = StateKey::new(state, key_fn, params.structure == Structure::McgsSelfOnly);

        let mut tree = SearchTree::new(state, params);
        let root = tree.root;
        tree.graph[root].key = Some(key.clone());

        let mut table = TranspositionTable::default();
        table.insert(key, root);
        tree.table = Some(table);
        tree
    }

    /// The node stored under `key`, created as a child of `parent` on a miss.
    pub(crate) fn lookup_or_insert(&mut self, key: StateKey, parent: NodeId, action: &G::Action, state: &G) -> (NodeId, bool) {
        let player = state.current_player();

        match self.table.as_ref().and_then(|t| t.get(&key)) {
            Some(node) => {
                if let Some(table) = self.table.as_mut() {
                    table.touch(&key);
                }
                self.link_child(parent, action, player, node);
                (node, false)
            }
            None => {
                let node = self.add_child(parent, action, player, state);
                self.graph[node].key = Some(key.clone());
                self.table.get_or_insert_with(TranspositionTable::default).insert(key, node);
                (node, true)
            }
        }
    }

    /// Prunes everything the last search did not reach, then roots the graph at `state`,
    /// reusing its node if one survived. Returns the pruned keys.
    pub fn reroot<K: KeyFunction<G> + ?Sized>(&mut self, state: &G, key_fn: &K) -> Vec<StateKey> {
        let self_only = self.params.structure == Structure::McgsSelfOnly;
        let table = self.table.get_or_insert_with(TranspositionTable::default);

        let pruned = table.prune();
        let key = StateKey::new(state, key_fn, self_only);
        let existing = table.get(&key);

        let removed: Vec<NodeId> = pruned.iter().map(|(_, node)| *node).collect();
        self.remove_nodes(&removed);

        let player = state.current_player();
        let root = match existing {
            Some(node) if self.graph[node].decision_player == player => node,
            stale => {
                // a node stored for a different player to move cannot act as root
                if let Some(node) = stale {
                    debug!("replacing transposition entry {:?} stored for player {}", key, self.graph[node].decision_player);
                    self.remove_nodes(&[node]);
                }
                let node = self.graph.add_node(TreeNode::new(player, 0, None, None));
                self.graph[node].key = Some(key.clone());
                node
            }
        };

        if let Some(table) = self.table.as_mut() {
            table.insert(key, root);
        }

        let node = &mut self.graph[root];
        node.parent = None;
        node.action_to_reach = None;
        node.state = Some(state.clone());
        node.terminal = state.is_terminal();

        self.root = root;
        self.root_player = player;
        self.rebase_depths();

        pruned.into_iter().map(|(key, _)| key).collect()
    }

    /// Depth becomes the shortest distance from the root. Nodes the root cannot reach
    /// are shifted by the old depth of the root, as a tree rebase would.
    fn rebase_depths(&mut self) {
        let base = self.graph[self.root].depth;
        let mut distance: HashMap<NodeId, u32> = HashMap::from([(self.root, 0)]);
        let mut frontier = VecDeque::from([self.root]);
        while let Some(id) = frontier.pop_front() {
            let next = distance[&id] + 1;
            let children: Vec<NodeId> = self.graph.neighbors(id).collect();
            for child in children {
                distance.entry(child).or_insert_with(|| {
                    frontier.push_back(child);
                    next
                });
            }
        }

        let ids: Vec<NodeId> = self.graph.node_indices().collect();
        for id in ids {
            let node = &mut self.graph[id];
            let shifted = node.depth.saturating_sub(base);
            node.depth = distance.get(&id).copied().unwrap_or(shifted);
        }
    }
}
