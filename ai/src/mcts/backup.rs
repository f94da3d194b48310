use crate::config::{BackupPolicy, TreePolicy};
use crate::game::Game;
use crate::mcts::node::{NodeId, TrajectoryStep};
use crate::mcts::stats::ActionStats;
use crate::mcts::tree::SearchTree;

fn blend(weight_on_result: f64, result: &[f64], other: &[f64]) -> Vec<f64> {
    result
        .iter()
        .zip(other.iter())
        .map(|(r, o)| weight_on_result * r + (1.0 - weight_on_result) * o)
        .collect()
}

impl<G: Game> SearchTree<G> {
    /// Credits `reward` to every step of `trajectory`, deepest first.
    pub fn backup(&mut self, trajectory: &[TrajectoryStep<G::Action>], reward: &[f64]) {
        if self.params.normalise_rewards || self.params.tree_policy == TreePolicy::UcbTuned {
            self.reward_range.observe(reward);
        }

        let mut result = self.paranoid_transform(reward);
        for step in trajectory.iter().rev() {
            result = self.backup_step(step, result);
        }
    }

    /// Under paranoid search every other player gets the negation of the searching player's reward.
    pub fn paranoid_transform(&self, reward: &[f64]) -> Vec<f64> {
        if !self.params.paranoid {
            return reward.to_vec();
        }
        let ours = reward.get(self.root_player).copied().unwrap_or(0.0);
        (0..reward.len())
            .map(|p| if p == self.root_player { ours } else { -ours })
            .collect()
    }

    /// Updates one node and returns what should be propagated to its parent.
    fn backup_step(&mut self, step: &TrajectoryStep<G::Action>, result: Vec<f64>) -> Vec<f64> {
        let num_players = self.num_players;
        let node = &mut self.graph[step.node];
        node.visits += 1;

        for action in step.considered.iter() {
            node.action_values
                .entry(action.clone())
                .or_insert_with(|| ActionStats::new(num_players))
                .valid_visits += 1;
        }
        let stats = node.action_values
            .entry(step.action.clone())
            .or_insert_with(|| ActionStats::new(num_players));
        if !step.considered.contains(&step.action) {
            stats.valid_visits += 1;
        }
        stats.update(&result);

        let player = node.decision_player;
        let visits = node.visits;
        let link = node.oma.clone();

        if let Some(link) = link {
            let pooled = self.graph[link.parent]
                .oma_stats
                .entry(link.parent_action)
                .or_default()
                .entry(step.action.clone())
                .or_default();
            pooled.n_visits += 1;
            pooled.total_value += result[player];
        }

        if self.params.tree_policy == TreePolicy::RegretMatching {
            let every = step.considered.len().max(10) as u32;
            if visits >= every && visits % every == 0 {
                self.update_regret_average(step.node, &step.considered);
            }
        }

        self.propagated_result(step.node, &step.action, &step.considered, result)
    }

    fn propagated_result(&self, id: NodeId, taken: &G::Action, considered: &[G::Action], result: Vec<f64>) -> Vec<f64> {
        let policy = self.params.backup_policy;
        if policy == BackupPolicy::MonteCarlo {
            return result;
        }

        let node = &self.graph[id];
        let player = node.decision_player;

        // best by mean for the acting player, among actions that have been tried
        let best = considered
            .iter()
            .filter_map(|a| node.action_values.get(a).filter(|s| s.n_visits > 0).map(|s| (a, s)))
            .fold(None, |best: Option<(&G::Action, &ActionStats)>, (a, s)| match best {
                Some((_, b)) if b.mean(player) >= s.mean(player) => best,
                _ => Some((a, s)),
            });
        let Some((best_action, best_stats)) = best else {
            return result;
        };
        let best_mean = best_stats.mean_vector();

        let lambda = self.params.backup_lambda;

        match policy {
            BackupPolicy::MonteCarlo => result,
            BackupPolicy::Lambda => match node.action_values.get(taken) {
                Some(stats) => blend(lambda, &result, &stats.mean_vector()),
                None => result,
            },
            BackupPolicy::MaxLambda => blend(lambda, &result, &best_mean),
            BackupPolicy::MaxMonteCarlo => {
                let threshold = self.params.max_backup_threshold;
                if node.visits > threshold && best_action != taken {
                    blend(threshold as f64 / node.visits as f64, &result, &best_mean)
                } else {
                    result
                }
            }
        }
    }
}
