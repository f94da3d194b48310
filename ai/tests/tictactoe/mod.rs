#![allow(dead_code)]

use rand::Rng;
use ai::{Game, Outcome};

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8],
    [0, 3, 6], [1, 4, 7], [2, 5, 8],
    [0, 4, 8], [2, 4, 6],
];

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct TicTacToe {
    pub board: [Option<usize>; 9],
    pub moves: u32,
}

impl TicTacToe {
    pub fn key(&self) -> String {
        self.board
            .iter()
            .map(|cell| match cell {
                Some(0) => 'X',
                Some(_) => 'O',
                None => '.',
            })
            .collect()
    }

    pub fn play(&self, square: usize) -> TicTacToe {
        let mut next = self.clone();
        next.board[square] = Some(self.current_player());
        next.moves += 1;
        next
    }

    fn winner(&self) -> Option<usize> {
        LINES.iter().find_map(|[a, b, c]| match (self.board[*a], self.board[*b], self.board[*c]) {
            (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
            _ => None,
        })
    }
}

impl Game for TicTacToe {
    type Action = usize;
    type Error = String;

    fn actions(&self) -> Vec<usize> {
        if self.winner().is_some() {
            return Vec::new();
        }
        (0..9).filter(|square| self.board[*square].is_none()).collect()
    }

    fn apply_action<R: Rng + ?Sized>(&self, square: usize, _rng: &mut R) -> Result<Self, String> {
        if self.board.get(square) != Some(&None) {
            return Err(format!("square {} is not free", square));
        }
        Ok(self.play(square))
    }

    fn outcome(&self) -> Option<Outcome> {
        match self.winner() {
            Some(player) => Some(Outcome::Winner(player)),
            None if self.moves == 9 => Some(Outcome::Draw),
            None => None,
        }
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
