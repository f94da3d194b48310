use rand::Rng;
use rand::seq::SliceRandom;
use crate::config::{FinalSelection, TreePolicy};
use crate::error::{Result, SearchError};
use crate::game::Game;
use crate::mcts::math;
use crate::mcts::node::{NodeId, TreeNode};
use crate::mcts::tree::SearchTree;

/// Index of the largest score; the first wins ties, so shuffle beforehand for random tie-breaks.
fn arg_max(scores: &[f64]) -> usize {
    let mut best = 0;
    for (index, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = index;
        }
    }
    best
}

impl<G: Game> SearchTree<G> {
    /// Candidate actions at a node, narrowed by progressive widening when it is on.
    pub fn actions_to_consider(&self, id: NodeId) -> Vec<G::Action> {
        let node = &self.graph[id];
        if !self.params.progressive_widening() || node.available.is_empty() {
            return node.available.clone();
        }

        let width = self.params.progressive_widening_constant * (node.visits as f64).powf(self.params.progressive_widening_exponent);
        let width = (width.floor() as usize).clamp(1, node.available.len());
        node.available[..width].to_vec()
    }

    /// One score per candidate under the configured tree policy.
    pub fn action_scores(&self, id: NodeId, candidates: &[G::Action]) -> Vec<f64> {
        let node = &self.graph[id];
        candidates
            .iter()
            .map(|action| match self.params.tree_policy {
                TreePolicy::Uniform => 1.0,
                TreePolicy::Greedy => self.exploit_value(node, action),
                TreePolicy::Ucb | TreePolicy::UcbTuned | TreePolicy::AlphaGo => self.ucb_value(node, action),
                TreePolicy::RegretMatching => self.regret_value(node, action),
                TreePolicy::Exp3 => self.exp3_value(node, action),
            })
            .collect()
    }

    /// Picks an action from `candidates`. With `explore` off, epsilon exploration is skipped.
    pub fn tree_policy_action<R: Rng + ?Sized>(&self, id: NodeId, candidates: &[G::Action], explore: bool, rng: &mut R) -> Result<G::Action> {
        match candidates.len() {
            0 => return Err(SearchError::NoLegalActions),
            1 => return Ok(candidates[0].clone()),
            _ => {}
        }

        let mut shuffled = candidates.to_vec();
        shuffled.shuffle(rng);

        let explore_now = explore && rng.gen::<f64>() < self.params.explore_epsilon;

        let chosen = match self.params.tree_policy {
            TreePolicy::Uniform => 0,
            TreePolicy::Greedy if explore_now => 0,
            TreePolicy::Greedy | TreePolicy::Ucb | TreePolicy::UcbTuned | TreePolicy::AlphaGo => {
                arg_max(&self.action_scores(id, &shuffled))
            }
            TreePolicy::RegretMatching | TreePolicy::Exp3 => {
                if explore_now {
                    0
                } else {
                    match math::pdf(&self.action_scores(id, &shuffled)) {
                        Some(probabilities) => math::sample_from(&probabilities, rng),
                        None => 0,
                    }
                }
            }
        };
        Ok(shuffled.swap_remove(chosen))
    }

    /// The action to actually play once the search is over.
    pub fn best_action<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Option<G::Action> {
        let node = &self.graph[id];
        let mut candidates = self.actions_to_consider(id);
        if candidates.is_empty() {
            candidates = node.action_values.keys().cloned().collect();
        }
        if candidates.is_empty() {
            return None;
        }

        match self.params.tree_policy {
            TreePolicy::RegretMatching => {
                let strategy: Vec<f64> = candidates
                    .iter()
                    .map(|a| node.regret_average.get(a).copied().unwrap_or(0.0))
                    .collect();
                let probabilities = math::pdf(&strategy).or_else(|| math::pdf(&self.action_scores(id, &candidates)));
                let index = match probabilities {
                    Some(probabilities) => math::sample_from(&probabilities, rng),
                    None => rng.gen_range(0..candidates.len()),
                };
                return Some(candidates.swap_remove(index));
            }
            TreePolicy::Exp3 => return self.tree_policy_action(id, &candidates, false, rng).ok(),
            _ => {}
        }

        let visits: Vec<u32> = candidates
            .iter()
            .map(|a| node.action_values.get(a).map_or(0, |s| s.n_visits))
            .collect();
        let all_equal = visits.iter().all(|v| *v == visits[0]);

        let player = node.decision_player;
        let scores: Vec<f64> = candidates
            .iter()
            .zip(visits.iter())
            .map(|(action, visits)| {
                let value = match self.params.final_selection {
                    FinalSelection::Robust if !all_equal => *visits as f64,
                    _ => match node.action_values.get(action) {
                        Some(stats) if stats.n_visits > 0 => stats.mean(player),
                        _ => f64::NEG_INFINITY,
                    },
                };
                value + self.params.noise_epsilon * rng.gen::<f64>()
            })
            .collect();

        Some(candidates.swap_remove(arg_max(&scores)))
    }

    /// Mean (normalised if configured) plus progressive bias, blended with the OMA pool.
    pub(crate) fn exploit_value(&self, node: &TreeNode<G>, action: &G::Action) -> f64 {
        let stats = node.action_values.get(action);
        let n = stats.map_or(0, |s| s.n_visits);

        let mut value = match stats {
            Some(stats) if n > 0 => {
                let mean = stats.mean(node.decision_player);
                if self.params.normalise_rewards {
                    math::normalise(mean, self.reward_range.low, self.reward_range.high)
                } else {
                    mean
                }
            }
            _ => 0.0,
        };
        value += self.progressive_bias(node, action, n);

        self.oma_blend(node, action, n, value)
    }

    fn progressive_bias(&self, node: &TreeNode<G>, action: &G::Action, n: u32) -> f64 {
        if self.params.progressive_bias <= 0.0 {
            return 0.0;
        }
        let heuristic = node.heuristic_values.get(action).copied().unwrap_or(0.0);
        self.params.progressive_bias * heuristic / (n as f64 + 1.0)
    }

    fn ucb_value(&self, node: &TreeNode<G>, action: &G::Action) -> f64 {
        let Some(stats) = node.action_values.get(action).filter(|s| s.n_visits > 0) else {
            return self.params.first_play_urgency + self.progressive_bias(node, action, 0);
        };

        let n = stats.n_visits as f64;
        let valid = stats.valid_visits.max(stats.n_visits) as f64;
        let k = self.params.k;

        let mut explore = match self.params.tree_policy {
            TreePolicy::AlphaGo => k * valid.sqrt() / (n + 1.0),
            TreePolicy::UcbTuned => {
                let range = if self.params.normalise_rewards || !self.reward_range.is_known() {
                    1.0
                } else {
                    self.reward_range.width()
                };
                let variance = stats.variance(node.decision_player) / (range * range);
                let bound = (variance + (2.0 * valid.ln() / n).sqrt()).min(0.25);
                k * range * (valid.ln() / n * bound).sqrt()
            }
            _ => k * (valid.ln() / n).sqrt(),
        };

        if self.params.puct {
            explore *= node.puct_weights.get(action).copied().unwrap_or(0.0);
        }

        self.exploit_value(node, action) + explore
    }

    fn regret_value(&self, node: &TreeNode<G>, action: &G::Action) -> f64 {
        let stats = node.action_values.get(action);
        let n = stats.map_or(0, |s| s.n_visits);

        let player = node.decision_player;
        let value = stats.map_or(0.0, |s| s.mean(player)) + self.progressive_bias(node, action, n);
        let visits = node.visits as f64;

        let mut regret = value * visits - node.node_value(player) * visits;
        if n == 0 {
            regret += self.params.first_play_urgency;
        }
        regret.max(0.0)
    }

    fn exp3_value(&self, node: &TreeNode<G>, action: &G::Action) -> f64 {
        let stats = node.action_values.get(action);
        let n = stats.map_or(0, |s| s.n_visits);
        let player = node.decision_player;

        let mut value = match stats {
            Some(stats) if n > 0 => {
                let mean = stats.mean(player);
                if self.params.normalise_rewards {
                    math::normalise(mean, self.reward_range.low, self.reward_range.high)
                } else {
                    mean - node.node_value(player)
                }
            }
            _ => 0.0,
        };
        value += self.progressive_bias(node, action, n);

        let mut score = (value / self.params.exp3_boltzmann).exp();
        if !score.is_finite() {
            score = 1e6;
        }
        if n == 0 {
            score += self.params.first_play_urgency;
        }
        score
    }

    /// Accumulates the current regret-matching strategy into the node's running average.
    pub(crate) fn update_regret_average(&mut self, id: NodeId, considered: &[G::Action]) {
        let scores = self.action_scores(id, considered);
        let strategy = math::pdf(&scores).unwrap_or_else(|| vec![1.0 / considered.len() as f64; considered.len()]);

        let node = &mut self.graph[id];
        for (action, p) in considered.iter().zip(strategy) {
            *node.regret_average.entry(action.clone()).or_insert(0.0) += p;
        }
    }
}
