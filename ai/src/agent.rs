use rand::{Rng, RngCore};
use crate::game::Game;

/// A fixed policy, used for rollouts and to model opponents.
pub trait Agent<G: Game> {
    /// `actions` is never empty.
    fn choose(&mut self, state: &G, actions: &[G::Action], rng: &mut dyn RngCore) -> G::Action;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomAgent;

impl<G: Game> Agent<G> for RandomAgent {
    fn choose(&mut self, _state: &G, actions: &[G::Action], rng: &mut dyn RngCore) -> G::Action {
        let random_index = rng.gen_range(0..actions.len());
        actions[random_index].clone()
    }
}
