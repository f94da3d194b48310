use rand::Rng;
use ai::{Game, Outcome};

/// Remove `count` stones from heap `heap`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Take {
    pub heap: usize,
    pub count: u32,
}

/// Multi-player nim: players take turns removing stones, whoever takes the last stone wins.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Nim {
    heaps: Vec<u32>,
    players: usize,
    to_move: usize,
    turn: u32,
    /// Largest number of stones one move may take.
    max_take: u32,
}

impl Nim {
    pub fn new(players: usize, heaps: Vec<u32>, max_take: u32) -> Self {
        Nim { heaps, players, to_move: 0, turn: 0, max_take }
    }

    /// Heap sizes and who moves next; used as the transposition key.
    pub fn key(&self) -> String {
        format!("{:?}@{}", self.heaps, self.to_move)
    }

    fn last_mover(&self) -> usize {
        (self.to_move + self.players - 1) % self.players
    }
}

impl Game for Nim {
    type Action = Take;
    type Error = String;

    fn actions(&self) -> Vec<Take> {
        self.heaps
            .iter()
            .enumerate()
            .flat_map(|(heap, stones)| (1..=(*stones).min(self.max_take)).map(move |count| Take { heap, count }))
            .collect()
    }

    fn apply_action<R: Rng + ?Sized>(&self, action: Take, _rng: &mut R) -> Result<Self, String> {
        let mut next = self.clone();
        match next.heaps.get_mut(action.heap) {
            Some(stones) if *stones >= action.count && action.count > 0 => *stones -= action.count,
            _ => return Err(format!("illegal move {:?} on {:?}", action, self.heaps)),
        }
        next.to_move = (next.to_move + 1) % next.players;
        next.turn += 1;
        Ok(next)
    }

    fn outcome(&self) -> Option<Outcome> {
        if self.heaps.iter().all(|h| *h == 0) && self.turn > 0 {
            Some(Outcome::Winner(self.last_mover()))
        } else {
            None
        }
    }

    fn current_player(&self) -> usize {
        self.to_move
    }

    fn num_players(&self) -> usize {
        self.players
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn round(&self) -> u32 {
        self.turn / self.players as u32
    }
}
