use std::fmt::Debug;
use std::hash::Hash;
use rand::Rng;

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Winner(usize),
    Winners(Vec<usize>),
    Draw,
    Scores(Vec<f64>),
}

impl Outcome {
    /// Terminal reward per player: +1 for a win, -1 for a loss, 0 for a draw.
    pub fn rewards(&self, num_players: usize) -> Vec<f64> {
        match self {
            Outcome::Winner(winner) => (0..num_players)
                .map(|p| if p == *winner { 1.0 } else { -1.0 })
                .collect(),
            Outcome::Winners(winners) => (0..num_players)
                .map(|p| if winners.contains(&p) { 1.0 } else { -1.0 })
                .collect(),
            Outcome::Draw => vec![0.0; num_players],
            Outcome::Scores(scores) => {
                let mut scores = scores.clone();
                scores.resize(num_players, 0.0);
                scores
            }
        }
    }
}

/// The simulator a search runs against. Players are indexed `0..num_players()`.
pub trait Game: Clone {
    type Action: Clone + Eq + Hash + Debug;
    type Error: Debug;

    fn actions(&self) -> Vec<Self::Action>;
    fn apply_action<R: Rng + ?Sized>(&self, action: Self::Action, rng: &mut R) -> Result<Self, Self::Error>;
    fn outcome(&self) -> Option<Outcome>;

    fn current_player(&self) -> usize;
    fn num_players(&self) -> usize;

    /// Counts turns, and must change whenever a new player's turn starts.
    fn turn(&self) -> u32;
    /// May advance by more than one in a single transition.
    fn round(&self) -> u32;

    fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    fn rewards(&self) -> Option<Vec<f64>> {
        self.outcome().map(|outcome| outcome.rewards(self.num_players()))
    }
}
