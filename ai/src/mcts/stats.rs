/// Running statistics for one action at one node.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionStats {
    pub n_visits: u32,
    /// Visits during which the action was on offer; never less than `n_visits`.
    pub valid_visits: u32,
    pub total_value: Vec<f64>,
    pub squared_total_value: Vec<f64>,
}

impl ActionStats {
    pub fn new(num_players: usize) -> Self {
        ActionStats {
            n_visits: 0,
            valid_visits: 0,
            total_value: vec![0.0; num_players],
            squared_total_value: vec![0.0; num_players],
        }
    }

    pub fn update(&mut self, result: &[f64]) {
        self.n_visits += 1;
        for (player, value) in result.iter().enumerate() {
            self.total_value[player] += value;
            self.squared_total_value[player] += value * value;
        }
    }

    /// Credits `visits` pseudo-observations of `value` to `player` (and `-value` to the rest when paranoid).
    pub fn seed(&mut self, player: usize, value: f64, visits: u32, paranoid: bool) {
        self.n_visits += visits;
        self.valid_visits += visits;
        for (p, (total, squared)) in self.total_value.iter_mut().zip(self.squared_total_value.iter_mut()).enumerate() {
            let v = if p == player {
                value
            } else if paranoid {
                -value
            } else {
                continue;
            };
            *total += v * visits as f64;
            *squared += v * v * visits as f64;
        }
    }

    pub fn mean(&self, player: usize) -> f64 {
        if self.n_visits == 0 {
            return 0.0;
        }
        self.total_value[player] / self.n_visits as f64
    }

    pub fn mean_vector(&self) -> Vec<f64> {
        (0..self.total_value.len()).map(|p| self.mean(p)).collect()
    }

    pub fn variance(&self, player: usize) -> f64 {
        if self.n_visits == 0 {
            return 0.0;
        }
        let n = self.n_visits as f64;
        let mean = self.total_value[player] / n;
        (self.squared_total_value[player] / n - mean * mean).max(0.0)
    }
}

/// Smallest and largest raw reward seen, used to normalise means into [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardRange {
    pub low: f64,
    pub high: f64,
}

impl Default for RewardRange {
    fn default() -> Self {
        RewardRange { low: f64::INFINITY, high: f64::NEG_INFINITY }
    }
}

impl RewardRange {
    pub fn observe(&mut self, values: &[f64]) {
        for v in values {
            self.low = self.low.min(*v);
            self.high = self.high.max(*v);
        }
    }

    pub fn is_known(&self) -> bool {
        self.high > self.low
    }

    pub fn width(&self) -> f64 {
        if self.is_known() { self.high - self.low } else { 0.0 }
    }
}
