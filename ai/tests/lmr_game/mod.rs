#![allow(dead_code)]

use rand::Rng;
use ai::{Game, Outcome};

/// A single decision between three actions with fixed payoffs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LmrAction {
    Left,
    Middle,
    Right,
}

pub const ALL: [LmrAction; 3] = [LmrAction::Left, LmrAction::Middle, LmrAction::Right];

#[derive(Clone, Debug)]
pub struct LmrGame {
    pub chosen: Option<LmrAction>,
    pub payoffs: [f64; 3],
    /// Choosing Right fails inside the game model.
    pub broken_right: bool,
}

impl Default for LmrGame {
    fn default() -> Self {
        LmrGame { chosen: None, payoffs: [0.0, 1.0, 0.5], broken_right: false }
    }
}

impl LmrGame {
    pub fn broken() -> Self {
        LmrGame { broken_right: true, ..Default::default() }
    }
}

impl Game for LmrGame {
    type Action = LmrAction;
    type Error = String;

    fn actions(&self) -> Vec<LmrAction> {
        match self.chosen {
            None => ALL.to_vec(),
            Some(_) => Vec::new(),
        }
    }

    fn apply_action<R: Rng + ?Sized>(&self, action: LmrAction, _rng: &mut R) -> Result<Self, String> {
        if self.broken_right && action == LmrAction::Right {
            return Err("right is broken".to_string());
        }
        Ok(LmrGame { chosen: Some(action), ..self.clone() })
    }

    fn outcome(&self) -> Option<Outcome> {
        let index = ALL.iter().position(|a| Some(*a) == self.chosen)?;
        Some(Outcome::Scores(vec![self.payoffs[index]]))
    }

    fn current_player(&self) -> usize {
        0
    }

    fn num_players(&self) -> usize {
        1
    }

    fn turn(&self) -> u32 {
        self.chosen.is_some() as u32
    }

    fn round(&self) -> u32 {
        self.turn()
    }
}
