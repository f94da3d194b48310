use std::collections::HashMap;
use std::hash::Hash;
use crate::mcts::math;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MastStats {
    pub visits: u32,
    pub total_value: f64,
}

impl MastStats {
    pub fn mean(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.total_value / self.visits as f64)
    }
}

/// Per-player running value of every action seen, wherever in the game it was played.
#[derive(Clone, Debug)]
pub struct MastTable<A: Eq + Hash> {
    stats: Vec<HashMap<A, MastStats>>,
}

impl<A: Clone + Eq + Hash> MastTable<A> {
    pub fn new(num_players: usize) -> Self {
        MastTable { stats: vec![HashMap::new(); num_players] }
    }

    pub fn update(&mut self, player: usize, action: &A, value: f64) {
        if let Some(table) = self.stats.get_mut(player) {
            let entry = table.entry(action.clone()).or_default();
            entry.visits += 1;
            entry.total_value += value;
        }
    }

    /// Records `reward[player]` for every `(player, action)` pair played.
    pub fn update_all(&mut self, actions: &[(usize, A)], reward: &[f64]) {
        for (player, action) in actions {
            if let Some(value) = reward.get(*player) {
                self.update(*player, action, *value);
            }
        }
    }

    pub fn get(&self, player: usize, action: &A) -> Option<&MastStats> {
        self.stats.get(player).and_then(|table| table.get(action))
    }

    /// Mean value of `action` for `player`, or `default` if it has never been seen.
    pub fn value(&self, player: usize, action: &A, default: f64) -> f64 {
        self.get(player, action).and_then(MastStats::mean).unwrap_or(default)
    }

    pub fn len(&self, player: usize) -> usize {
        self.stats.get(player).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.stats.iter().all(HashMap::is_empty)
    }

    /// Scales all statistics by `gamma`, dropping entries whose visits round down to zero.
    pub fn decay(&mut self, gamma: f64) {
        for table in self.stats.iter_mut() {
            table.retain(|_, stats| {
                stats.visits = (stats.visits as f64 * gamma) as u32;
                stats.total_value *= gamma;
                stats.visits > 0
            });
        }
    }
}

/// Boltzmann rollout policy over MAST values, optionally mixed with an action heuristic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MastPolicy {
    pub temperature: f64,
    pub default_value: f64,
    /// Weight of the heuristic in the mix; 0.5 is an even average.
    pub heuristic_weight: f64,
}

impl MastPolicy {
    pub fn action_value<A: Clone + Eq + Hash>(&self, table: &MastTable<A>, player: usize, action: &A, heuristic: Option<f64>) -> f64 {
        let mast = table.value(player, action, self.default_value);
        match heuristic {
            Some(h) if self.heuristic_weight > 0.0 => (1.0 - self.heuristic_weight) * mast + self.heuristic_weight * h,
            _ => mast,
        }
    }

    /// `heuristics`, when given, lines up with `actions`.
    pub fn probabilities<A: Clone + Eq + Hash>(&self, table: &MastTable<A>, player: usize, actions: &[A], heuristics: Option<&[f64]>) -> Vec<f64> {
        let values: Vec<f64> = actions
            .iter()
            .enumerate()
            .map(|(i, a)| self.action_value(table, player, a, heuristics.and_then(|h| h.get(i).copied())))
            .collect();
        math::softmax(&values, self.temperature)
    }
}
