use std::fmt;
use anyhow::{anyhow, Result};
use log::debug;
use rand_pcg::Pcg64;
use ai::{Agent, Game, MctsPlayer, Outcome, RandomAgent};

/// Whoever sits at one player index for a game.
pub enum Seat<G: Game> {
    Mcts(Box<MctsPlayer<G>>),
    Random(RandomAgent),
}

impl<G: Game> Seat<G> {
    fn choose(&mut self, state: &G, rng: &mut Pcg64) -> Result<G::Action> {
        match self {
            Seat::Mcts(player) => Ok(player.get_action(state)?),
            Seat::Random(agent) => {
                let actions = state.actions();
                if actions.is_empty() {
                    return Err(anyhow!("no legal actions"));
                }
                Ok(agent.choose(state, &actions, rng))
            }
        }
    }

    fn observe(&mut self, player: usize, action: &G::Action) {
        if let Seat::Mcts(mcts) = self {
            mcts.observe(player, action.clone());
        }
    }
}

/// Plays one game to the end and returns how it finished.
pub fn play_game<G: Game>(start: &G, seats: &mut [Seat<G>], rng: &mut Pcg64) -> Result<Outcome> {
    let mut state = start.clone();
    while !state.is_terminal() {
        let actor = state.current_player();
        let seat = seats.get_mut(actor).ok_or_else(|| anyhow!("no seat for player {}", actor))?;
        let action = seat.choose(&state, rng)?;
        debug!("player {} plays {:?}", actor, action);

        for seat in seats.iter_mut() {
            seat.observe(actor, &action);
        }
        state = state
            .apply_action(action, rng)
            .map_err(|e| anyhow!("game rejected a move: {:?}", e))?;
    }
    state.outcome().ok_or_else(|| anyhow!("game ended without an outcome"))
}

/// Results from the point of view of one candidate player.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: &Outcome, candidate: usize, num_players: usize) {
        let reward = outcome.rewards(num_players).get(candidate).copied().unwrap_or(0.0);
        if reward > 0.0 {
            self.wins += 1;
        } else if reward < 0.0 {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f64 {
        if self.games() == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games() as f64
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: {} won, {} lost, {} drawn ({:.1}% wins)",
            self.games(),
            self.wins,
            self.losses,
            self.draws,
            100.0 * self.win_rate()
        )
    }
}

/// Plays `games` games, the candidate moving to the next player index each game.
/// `seats(game, candidate)` builds the table for one game.
pub fn run_match<G, F>(start: &G, games: usize, mut seats: F, rng: &mut Pcg64) -> Result<Tally>
where
    G: Game,
    F: FnMut(usize, usize) -> Result<Vec<Seat<G>>>,
{
    let num_players = start.num_players();
    let mut tally = Tally::default();

    for game in 0..games {
        let candidate = game % num_players;
        let mut table = seats(game, candidate)?;
        let outcome = play_game(start, &mut table, rng)?;
        debug!("game {}: candidate at {} saw {:?}", game, candidate, outcome);
        tally.record(&outcome, candidate, num_players);
    }
    Ok(tally)
}
