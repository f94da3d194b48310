use std::collections::HashSet;
use log::trace;
use rand::RngCore;
use crate::config::{Information, Structure};
use crate::error::{Result, SearchError};
use crate::game::Game;
use crate::heuristics::StateHeuristic;
use crate::mcts::mast::MastTable;
use crate::mcts::node::{NodeId, TrajectoryStep};
use crate::mcts::rollout::{advance, final_reward, rollout, RolloutContext, RolloutPolicies};
use crate::mcts::termination::RolloutTracker;
use crate::mcts::transposition::{KeyFunction, StateKey};
use crate::mcts::tree::SearchTree;

/// Everything one iteration produced that the coordinator still needs.
#[derive(Clone, Debug)]
pub struct Iteration<A> {
    pub tree_actions: Vec<(usize, A)>,
    pub rollout_actions: Vec<(usize, A)>,
    pub reward: Vec<f64>,
}

/// Collaborators owned by the coordinator and lent to each iteration.
pub struct Collaborators<'a, G: Game> {
    pub policies: &'a mut RolloutPolicies<G>,
    pub mast: &'a MastTable<G::Action>,
    pub state_heuristic: Option<&'a dyn StateHeuristic<G>>,
    pub key_function: Option<&'a dyn KeyFunction<G>>,
}

impl<G: Game> SearchTree<G> {
    fn root_state(&self) -> Result<G> {
        self.graph[self.root]
            .state
            .clone()
            .ok_or_else(|| SearchError::InvalidConfiguration("search root has no state".to_string()))
    }

    /// Single tree: select and expand one node, roll out, back up.
    pub fn tree_iteration<R: RngCore>(&mut self, collaborators: &mut Collaborators<G>, rng: &mut R) -> Result<Iteration<G::Action>> {
        let closed_loop = self.params.information == Information::ClosedLoop;

        let mut state = self.root_state()?;
        let mut current = self.root;
        let mut trajectory = Vec::new();
        let mut tree_actions = Vec::new();

        loop {
            self.prepare(current, &state);
            if state.is_terminal() || self.graph[current].depth >= self.params.max_tree_depth {
                break;
            }
            let candidates = self.actions_to_consider(current);
            if candidates.is_empty() {
                break;
            }

            let action = self.tree_policy_action(current, &candidates, true, rng)?;
            let player = self.graph[current].decision_player;

            // closed loop trusts the stored snapshot instead of re-sampling the transition
            let stored = self.graph[current].any_child(&action).filter(|_| closed_loop);
            let next = match stored.and_then(|child| self.graph[child].state.clone()) {
                Some(snapshot) => snapshot,
                None => advance(&state, action.clone(), rng)?,
            };

            tree_actions.push((player, action.clone()));
            trajectory.push(TrajectoryStep { node: current, action: action.clone(), considered: candidates });
            state = next;

            if state.is_terminal() {
                break;
            }

            let next_player = state.current_player();
            match stored.or_else(|| self.graph[current].child(&action, next_player)) {
                Some(child) => current = child,
                None => {
                    let child = self.add_child(current, &action, next_player, &state);
                    self.prepare(child, &state);
                    break;
                }
            }
        }

        self.finish_iteration(state, trajectory, tree_actions, collaborators, rng)
    }

    /// Graph search: like `tree_iteration`, but nodes are shared through the transposition table.
    ///
    /// The descent stops right after an action is tried for the first time, and whenever
    /// it would revisit a node already on this iteration's path.
    pub fn graph_iteration<R: RngCore>(&mut self, collaborators: &mut Collaborators<G>, rng: &mut R) -> Result<Iteration<G::Action>> {
        let self_only = self.params.structure == Structure::McgsSelfOnly;
        let key_function = collaborators
            .key_function
            .ok_or_else(|| SearchError::InvalidConfiguration("graph search needs a key function".to_string()))?;

        let mut state = self.root_state()?;
        let mut current = self.root;
        let mut on_path: HashSet<NodeId> = HashSet::from([current]);
        let mut trajectory = Vec::new();
        let mut tree_actions = Vec::new();

        loop {
            self.prepare(current, &state);
            if state.is_terminal() || trajectory.len() as u32 >= self.params.max_tree_depth {
                break;
            }
            let candidates = self.actions_to_consider(current);
            if candidates.is_empty() {
                break;
            }

            let action = self.tree_policy_action(current, &candidates, true, rng)?;
            let node = &self.graph[current];
            let player = node.decision_player;
            let first_try = node.stats(&action).map_or(true, |s| s.n_visits == 0);

            state = advance(&state, action.clone(), rng)?;
            tree_actions.push((player, action.clone()));
            trajectory.push(TrajectoryStep { node: current, action: action.clone(), considered: candidates });

            if state.is_terminal() {
                break;
            }

            let key = StateKey::new(&state, key_function, self_only);
            let (child, created) = self.lookup_or_insert(key, current, &action, &state);
            if created {
                self.prepare(child, &state);
                break;
            }
            if first_try || !on_path.insert(child) {
                break;
            }
            current = child;
        }

        self.finish_iteration(state, trajectory, tree_actions, collaborators, rng)
    }

    fn finish_iteration<R: RngCore>(
        &mut self,
        state: G,
        trajectory: Vec<TrajectoryStep<G::Action>>,
        tree_actions: Vec<(usize, G::Action)>,
        collaborators: &mut Collaborators<G>,
        rng: &mut R,
    ) -> Result<Iteration<G::Action>> {
        let last_actor = tree_actions.last().map_or(self.root_player, |(player, _)| *player);
        let mut tracker = RolloutTracker::new(&self.params, &state, self.root_player, last_actor);

        let heuristic = self.action_heuristic.clone();
        let mut context = RolloutContext {
            policies: &mut *collaborators.policies,
            mast: collaborators.mast,
            action_heuristic: heuristic.as_deref(),
            root_player: self.root_player,
        };
        let (final_state, rollout_actions) = rollout(state, &mut tracker, &mut context, rng)?;
        let reward = final_reward(&final_state, collaborators.state_heuristic)?;

        trace!("iteration: {} tree actions, {} rollout actions, reward {:?}", trajectory.len(), rollout_actions.len(), reward);

        self.backup(&trajectory, &reward);

        Ok(Iteration { tree_actions, rollout_actions, reward })
    }
}
