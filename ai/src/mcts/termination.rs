use crate::config::{MctsParams, RolloutIncrement, RolloutTermination};
use crate::game::Game;

/// Decides when a rollout stops, counting depth from the state it started in.
#[derive(Clone, Debug)]
pub struct RolloutTracker {
    termination: RolloutTermination,
    increment: RolloutIncrement,
    max_depth: u32,
    root_player: usize,
    start_turn: u32,
    start_round: u32,
    actions_taken: u32,
    last_actor: usize,
    last_turn: u32,
    last_round: u32,
}

impl RolloutTracker {
    /// `last_actor` is whoever made the final in-tree move (the root player if nobody did).
    pub fn new<G: Game>(params: &MctsParams, state: &G, root_player: usize, last_actor: usize) -> Self {
        let max_depth = if params.rollout_length_per_player {
            params.rollout_length * state.num_players() as u32
        } else {
            params.rollout_length
        };

        RolloutTracker {
            termination: params.rollout_termination,
            increment: params.rollout_increment,
            max_depth,
            root_player,
            start_turn: state.turn(),
            start_round: state.round(),
            actions_taken: 0,
            last_actor,
            last_turn: state.turn(),
            last_round: state.round(),
        }
    }

    /// Call with the state an action is about to be applied to.
    pub fn record<G: Game>(&mut self, before: &G) {
        self.actions_taken += 1;
        self.last_actor = before.current_player();
        self.last_turn = before.turn();
        self.last_round = before.round();
    }

    pub fn actions_taken(&self) -> u32 {
        self.actions_taken
    }

    fn depth<G: Game>(&self, state: &G) -> u32 {
        match self.increment {
            RolloutIncrement::Tick => self.actions_taken,
            RolloutIncrement::Turn => state.turn().saturating_sub(self.start_turn),
            RolloutIncrement::Round => state.round().saturating_sub(self.start_round),
        }
    }

    pub fn finished<G: Game>(&self, state: &G) -> bool {
        if state.is_terminal() {
            return true;
        }
        if self.depth(state) < self.max_depth {
            return false;
        }

        let current = state.current_player();
        match self.termination {
            RolloutTermination::Exact => true,
            RolloutTermination::EndAction => self.last_actor == self.root_player && current != self.root_player,
            RolloutTermination::StartAction => self.last_actor != self.root_player && current == self.root_player,
            RolloutTermination::EndTurn => state.turn() != self.last_turn,
            // rounds may jump by more than one
            RolloutTermination::EndRound => state.round() != self.last_round,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use crate::game::{Game, Outcome};
    use super::*;

    /// Players take turns of two actions each; a round is one turn per player.
    #[derive(Clone, Debug)]
    struct Ticker {
        ticks: u32,
        players: usize,
    }

    impl Game for Ticker {
        type Action = ();
        type Error = ();

        fn actions(&self) -> Vec<()> {
            vec![()]
        }

        fn apply_action<R: Rng + ?Sized>(&self, _action: (), _rng: &mut R) -> Result<Self, ()> {
            Ok(Ticker { ticks: self.ticks + 1, players: self.players })
        }

        fn outcome(&self) -> Option<Outcome> {
            (self.ticks >= 100).then_some(Outcome::Draw)
        }

        fn current_player(&self) -> usize {
            self.turn() as usize % self.players
        }

        fn num_players(&self) -> usize {
            self.players
        }

        fn turn(&self) -> u32 {
            self.ticks / 2
        }

        fn round(&self) -> u32 {
            self.turn() / self.players as u32
        }
    }

    fn run(params: &MctsParams, start: Ticker) -> u32 {
        let root_player = start.current_player();
        let mut tracker = RolloutTracker::new(params, &start, root_player, root_player);
        let mut state = start;
        while !tracker.finished(&state) {
            tracker.record(&state);
            state = state.apply_action((), &mut rand::thread_rng()).unwrap();
        }
        tracker.actions_taken()
    }

    fn params(length: u32, termination: RolloutTermination) -> MctsParams {
        MctsParams { rollout_length: length, rollout_termination: termination, ..Default::default() }
    }

    #[test]
    fn exact_counts_actions() {
        assert_eq!(run(&params(3, RolloutTermination::Exact), Ticker { ticks: 0, players: 2 }), 3);
        assert_eq!(run(&params(0, RolloutTermination::Exact), Ticker { ticks: 0, players: 2 }), 0);
    }

    #[test]
    fn per_player_length_scales_with_players() {
        let params = MctsParams { rollout_length_per_player: true, ..params(2, RolloutTermination::Exact) };
        assert_eq!(run(&params, Ticker { ticks: 0, players: 3 }), 6);
    }

    #[test]
    fn end_turn_waits_for_turn_boundary() {
        // 3 actions land mid-turn, so one more finishes the turn
        assert_eq!(run(&params(3, RolloutTermination::EndTurn), Ticker { ticks: 0, players: 2 }), 4);
    }

    #[test]
    fn end_round_waits_for_round_boundary() {
        assert_eq!(run(&params(1, RolloutTermination::EndRound), Ticker { ticks: 0, players: 3 }), 6);
    }

    #[test]
    fn start_action_stops_when_root_player_is_next() {
        // root player 0 acts on ticks 0-1, player 1 on ticks 2-3
        assert_eq!(run(&params(1, RolloutTermination::StartAction), Ticker { ticks: 0, players: 2 }), 4);
    }

    #[test]
    fn end_action_stops_when_root_player_finishes() {
        assert_eq!(run(&params(1, RolloutTermination::EndAction), Ticker { ticks: 0, players: 2 }), 2);
    }

    #[test]
    fn terminal_state_always_stops() {
        assert_eq!(run(&params(50, RolloutTermination::Exact), Ticker { ticks: 98, players: 2 }), 2);
    }
}
