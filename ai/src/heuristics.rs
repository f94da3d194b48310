use crate::game::Game;

/// Estimates the value of a non-terminal state for one player when a rollout is cut short.
pub trait StateHeuristic<G: Game> {
    fn evaluate(&self, state: &G, player: usize) -> f64;
}

impl<G: Game, F> StateHeuristic<G> for F
where
    F: Fn(&G, usize) -> f64,
{
    fn evaluate(&self, state: &G, player: usize) -> f64 {
        self(state, player)
    }
}

/// The terminal score if there is one, zero otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalScore;

impl<G: Game> StateHeuristic<G> for TerminalScore {
    fn evaluate(&self, state: &G, player: usize) -> f64 {
        state
            .rewards()
            .and_then(|rewards| rewards.get(player).copied())
            .unwrap_or(0.0)
    }
}

/// Scores an action in a state, given the full list of candidates it was drawn from.
pub trait ActionHeuristic<G: Game> {
    fn evaluate(&self, action: &G::Action, state: &G, context: &[G::Action]) -> f64;

    fn evaluate_all(&self, actions: &[G::Action], state: &G) -> Vec<f64> {
        actions.iter().map(|a| self.evaluate(a, state, actions)).collect()
    }
}

impl<G: Game, F> ActionHeuristic<G> for F
where
    F: Fn(&G::Action, &G, &[G::Action]) -> f64,
{
    fn evaluate(&self, action: &G::Action, state: &G, context: &[G::Action]) -> f64 {
        self(action, state, context)
    }
}
