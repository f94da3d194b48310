use rand::Rng;
use ai::{Game, Outcome};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PigAction {
    Roll,
    Hold,
}

/// Pig: roll to build up a turn total, hold to bank it, a one loses it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Pig {
    scores: Vec<u32>,
    turn_total: u32,
    to_move: usize,
    turn: u32,
    target: u32,
}

impl Pig {
    pub fn new(players: usize, target: u32) -> Self {
        Pig { scores: vec![0; players], turn_total: 0, to_move: 0, turn: 0, target }
    }

    pub fn key(&self) -> String {
        format!("{:?}+{}@{}", self.scores, self.turn_total, self.to_move)
    }

    /// Banked score as a fraction of the target; used to score unfinished rollouts.
    pub fn progress(&self, player: usize) -> f64 {
        let score = self.scores[player] + if player == self.to_move { self.turn_total } else { 0 };
        (score as f64 / self.target as f64).min(1.0)
    }

    fn pass(&mut self) {
        self.turn_total = 0;
        self.to_move = (self.to_move + 1) % self.scores.len();
        self.turn += 1;
    }
}

impl Game for Pig {
    type Action = PigAction;
    type Error = String;

    fn actions(&self) -> Vec<PigAction> {
        if self.outcome().is_some() {
            return Vec::new();
        }
        if self.turn_total == 0 {
            return vec![PigAction::Roll];
        }
        vec![PigAction::Roll, PigAction::Hold]
    }

    fn apply_action<R: Rng + ?Sized>(&self, action: PigAction, rng: &mut R) -> Result<Self, String> {
        let mut next = self.clone();
        match action {
            PigAction::Roll => match rng.gen_range(1..=6) {
                1 => next.pass(),
                pips => next.turn_total += pips,
            },
            PigAction::Hold => {
                if next.turn_total == 0 {
                    return Err("nothing to hold".to_string());
                }
                next.scores[next.to_move] += next.turn_total;
                if next.scores[next.to_move] < next.target {
                    next.pass();
                }
            }
        }
        Ok(next)
    }

    fn outcome(&self) -> Option<Outcome> {
        self.scores.iter().position(|s| *s >= self.target).map(Outcome::Winner)
    }

    fn current_player(&self) -> usize {
        self.to_move
    }

    fn num_players(&self) -> usize {
        self.scores.len()
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn round(&self) -> u32 {
        self.turn / self.scores.len() as u32
    }
}
