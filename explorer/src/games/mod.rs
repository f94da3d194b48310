mod nim;
mod pig;

use ai::{Game, MctsPlayer};

pub use nim::{Nim, Take};
pub use pig::{Pig, PigAction};

/// A game the explorer can set up a search player for.
pub trait Demo: Game + 'static {
    /// Attaches the key function and heuristics this game supplies.
    fn equip(player: MctsPlayer<Self>) -> MctsPlayer<Self>;
}

impl Demo for Nim {
    fn equip(player: MctsPlayer<Self>) -> MctsPlayer<Self> {
        player
            .with_key_function(Nim::key)
            .with_action_heuristic(|take: &Take, _: &Nim, _: &[Take]| take.count as f64)
    }
}

impl Demo for Pig {
    fn equip(player: MctsPlayer<Self>) -> MctsPlayer<Self> {
        player
            .with_key_function(Pig::key)
            .with_state_heuristic(Pig::progress)
            // holding grows more attractive as the turn total builds up
            .with_action_heuristic(|action: &PigAction, state: &Pig, _: &[PigAction]| match action {
                PigAction::Roll => 0.5,
                PigAction::Hold => state.progress(state.current_player()) * 2.0,
            })
    }
}
