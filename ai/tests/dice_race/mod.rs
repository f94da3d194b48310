#![allow(dead_code)]

use rand::Rng;
use ai::{Game, Outcome};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RaceAction {
    /// Advance by a die roll.
    Roll,
    /// Advance by two.
    Step,
    /// Advance by one and take another action this turn.
    Hop,
}

/// Players race to a target; a turn may hold several hops, so turns and actions differ.
#[derive(Clone, Debug)]
pub struct DiceRace {
    pub positions: Vec<u32>,
    pub target: u32,
    pub to_move: usize,
    pub turn: u32,
    pub hops_this_turn: u32,
}

impl DiceRace {
    pub fn new(players: usize, target: u32) -> Self {
        DiceRace { positions: vec![0; players], target, to_move: 0, turn: 0, hops_this_turn: 0 }
    }

    pub fn progress(&self, player: usize) -> f64 {
        self.positions[player] as f64 / self.target as f64
    }

    fn end_turn(&mut self) {
        self.to_move = (self.to_move + 1) % self.positions.len();
        self.turn += 1;
        self.hops_this_turn = 0;
    }
}

impl Game for DiceRace {
    type Action = RaceAction;
    type Error = String;

    fn actions(&self) -> Vec<RaceAction> {
        if self.outcome().is_some() {
            return Vec::new();
        }
        if self.hops_this_turn >= 2 {
            return vec![RaceAction::Roll, RaceAction::Step];
        }
        vec![RaceAction::Roll, RaceAction::Step, RaceAction::Hop]
    }

    fn apply_action<R: Rng + ?Sized>(&self, action: RaceAction, rng: &mut R) -> Result<Self, String> {
        let mut next = self.clone();
        let player = next.to_move;
        match action {
            RaceAction::Roll => {
                next.positions[player] += rng.gen_range(1..=6);
                next.end_turn();
            }
            RaceAction::Step => {
                next.positions[player] += 2;
                next.end_turn();
            }
            RaceAction::Hop => {
                if next.hops_this_turn >= 2 {
                    return Err("no hops left this turn".to_string());
                }
                next.positions[player] += 1;
                next.hops_this_turn += 1;
            }
        }
        Ok(next)
    }

    fn outcome(&self) -> Option<Outcome> {
        self.positions
            .iter()
            .position(|p| *p >= self.target)
            .map(Outcome::Winner)
    }

    fn current_player(&self) -> usize {
        self.to_move
    }

    fn num_players(&self) -> usize {
        self.positions.len()
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn round(&self) -> u32 {
        self.turn / self.positions.len() as u32
    }
}
