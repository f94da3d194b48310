use std::rc::Rc;
use log::warn;
use rand::RngCore;
use crate::config::{Information, MctsParams};
use crate::error::{Result, SearchError};
use crate::game::Game;
use crate::heuristics::ActionHeuristic;
use crate::mcts::node::{NodeId, TrajectoryStep};
use crate::mcts::rollout::{advance, final_reward};
use crate::mcts::search::{Collaborators, Iteration};
use crate::mcts::termination::RolloutTracker;
use crate::mcts::tree::SearchTree;

/// One tree per player, each holding only that player's own decisions.
pub struct MultiTreeSearch<G: Game> {
    trees: Vec<Option<SearchTree<G>>>,
    root_player: usize,
    params: MctsParams,
    action_heuristic: Option<Rc<dyn ActionHeuristic<G>>>,
}

/// Where one player's tree stands during an iteration.
struct Cursor<A> {
    node: Option<NodeId>,
    /// Action taken at `node` whose child is not resolved yet.
    pending: Option<A>,
    /// Out of the tree: a node was expanded or the depth limit was hit.
    done: bool,
    trajectory: Vec<TrajectoryStep<A>>,
}

impl<G: Game> MultiTreeSearch<G> {
    pub fn new(state: &G, mut params: MctsParams, action_heuristic: Option<Rc<dyn ActionHeuristic<G>>>) -> Self {
        // every tree is reached by replaying the shared state, so there is nothing to snapshot
        if params.information != Information::OpenLoop {
            warn!("multi-tree search always runs open loop");
            params.information = Information::OpenLoop;
        }

        let mut search = MultiTreeSearch {
            trees: (0..state.num_players()).map(|_| None).collect(),
            root_player: state.current_player(),
            params,
            action_heuristic,
        };
        search.trees[search.root_player] = Some(search.new_tree(state));
        search
    }

    fn new_tree(&self, state: &G) -> SearchTree<G> {
        let mut tree = SearchTree::new(state, self.params.clone());
        tree.action_heuristic = self.action_heuristic.clone();
        // paranoid backups are always relative to the searching player
        tree.root_player = self.root_player;
        tree
    }

    pub fn root_player(&self) -> usize {
        self.root_player
    }

    pub fn tree(&self, player: usize) -> Option<&SearchTree<G>> {
        self.trees.get(player).and_then(Option::as_ref)
    }

    pub fn root_tree(&self) -> Option<&SearchTree<G>> {
        self.tree(self.root_player)
    }

    /// Carries the searching player's tree over to the next decision by following its own
    /// observed actions; opponent trees are discarded.
    pub fn advance_root(&mut self, observed: &[(usize, G::Action)], state: &G) -> bool {
        let root_player = self.root_player;
        if state.current_player() != root_player {
            return false;
        }
        let Some(tree) = self.trees.get_mut(root_player).and_then(Option::as_mut) else {
            return false;
        };

        let mut node = tree.root;
        for (_, action) in observed.iter().filter(|(player, _)| *player == root_player) {
            match tree.node(node).child(action, root_player) {
                Some(child) => node = child,
                None => return false,
            }
        }
        tree.rootify(node, state);

        for (player, tree) in self.trees.iter_mut().enumerate() {
            if player != root_player {
                *tree = None;
            }
        }
        true
    }

    /// Moves `player`'s cursor along its pending action, expanding a node if the child is new.
    fn resolve(&mut self, player: usize, cursor: &mut Cursor<G::Action>, state: &G) {
        let (Some(node), Some(action)) = (cursor.node, cursor.pending.take()) else {
            return;
        };
        if cursor.done {
            return;
        }
        let Some(tree) = self.trees[player].as_mut() else {
            return;
        };

        match tree.node(node).child(&action, player) {
            Some(child) => cursor.node = Some(child),
            None => {
                let child = tree.add_child(node, &action, player, state);
                tree.prepare(child, state);
                cursor.node = Some(child);
                cursor.done = true;
            }
        }
    }

    pub fn iteration<R: RngCore>(&mut self, root_state: &G, collaborators: &mut Collaborators<G>, rng: &mut R) -> Result<Iteration<G::Action>> {
        let root_player = self.root_player;
        let mut cursors: Vec<Cursor<G::Action>> = self
            .trees
            .iter()
            .map(|tree| Cursor { node: tree.as_ref().map(|t| t.root), pending: None, done: false, trajectory: Vec::new() })
            .collect();

        let mut state = root_state.clone();
        let mut tree_actions = Vec::new();
        let mut rollout_actions = Vec::new();
        let mut tracker: Option<RolloutTracker> = None;

        while !state.is_terminal() {
            let actor = state.current_player();
            self.resolve(actor, &mut cursors[actor], &state);

            if tracker.is_none() && cursors[root_player].done {
                tracker = Some(RolloutTracker::new(&self.params, &state, root_player, root_player));
            }
            if tracker.as_ref().is_some_and(|t| t.finished(&state)) {
                break;
            }

            if self.trees[actor].is_none() {
                // an opponent's tree starts the first time they act
                let tree = self.new_tree(&state);
                cursors[actor].node = Some(tree.root);
                self.trees[actor] = Some(tree);
            }

            let in_tree = match (&mut self.trees[actor], cursors[actor].node) {
                (Some(tree), Some(node)) if !cursors[actor].done => {
                    tree.prepare(node, &state);
                    let candidates = tree.actions_to_consider(node);
                    if candidates.is_empty() || tree.node(node).depth >= self.params.max_tree_depth {
                        cursors[actor].done = true;
                        None
                    } else {
                        let action = tree.tree_policy_action(node, &candidates, true, rng)?;
                        cursors[actor].trajectory.push(TrajectoryStep { node, action: action.clone(), considered: candidates });
                        cursors[actor].pending = Some(action.clone());
                        Some(action)
                    }
                }
                _ => None,
            };

            let action = match in_tree {
                Some(action) => {
                    tree_actions.push((actor, action.clone()));
                    action
                }
                None => {
                    let actions = state.actions();
                    if actions.is_empty() {
                        return Err(SearchError::NoLegalActions);
                    }
                    let heuristic = self.action_heuristic.as_deref();
                    let action = collaborators
                        .policies
                        .for_player(actor, root_player)
                        .choose(&state, actions, collaborators.mast, heuristic, rng);
                    rollout_actions.push((actor, action.clone()));
                    action
                }
            };

            if let Some(tracker) = tracker.as_mut() {
                tracker.record(&state);
            }
            state = advance(&state, action, rng)?;
        }

        // actions taken just before the end still expand a node
        for (player, cursor) in cursors.iter_mut().enumerate() {
            self.resolve(player, cursor, &state);
        }

        let reward = final_reward(&state, collaborators.state_heuristic)?;
        for (player, cursor) in cursors.iter().enumerate() {
            if let Some(tree) = self.trees[player].as_mut() {
                tree.backup(&cursor.trajectory, &reward);
            }
        }

        Ok(Iteration { tree_actions, rollout_actions, reward })
    }
}
