#![allow(dead_code)]

use rand::Rng;
use ai::{Game, Outcome};

/// Players take turns adding 1 or 2 to a running total; whoever reaches `target` wins.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CounterGame {
    pub total: u32,
    pub target: u32,
    pub moves: u32,
}

impl CounterGame {
    pub fn new(target: u32) -> Self {
        CounterGame { total: 0, target, moves: 0 }
    }

    /// Only the total, so the same total reached with either player to move shares a key.
    pub fn key(&self) -> String {
        self.total.to_string()
    }

    pub fn play(&self, step: u32) -> CounterGame {
        CounterGame { total: self.total + step, target: self.target, moves: self.moves + 1 }
    }
}

impl Game for CounterGame {
    type Action = u32;
    type Error = String;

    fn actions(&self) -> Vec<u32> {
        if self.is_terminal() {
            return Vec::new();
        }
        (1..=2).filter(|step| self.total + step <= self.target).collect()
    }

    fn apply_action<R: Rng + ?Sized>(&self, step: u32, _rng: &mut R) -> Result<Self, String> {
        if !self.actions().contains(&step) {
            return Err(format!("cannot add {} to {}", step, self.total));
        }
        Ok(self.play(step))
    }

    fn outcome(&self) -> Option<Outcome> {
        // the player who moved last reached the target
        (self.total >= self.target).then(|| Outcome::Winner((self.moves as usize + 1) % 2))
    }

    fn current_player(&self) -> usize {
        self.moves as usize % 2
    }

    fn num_players(&self) -> usize {
        2
    }

    fn turn(&self) -> u32 {
        self.moves
    }

    fn round(&self) -> u32 {
        self.moves / 2
    }
}
