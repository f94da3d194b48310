use rand::{Rng, RngCore};
use crate::agent::Agent;
use crate::config::{MctsParams, RolloutKind};
use crate::error::{Result, SearchError};
use crate::game::Game;
use crate::heuristics::{ActionHeuristic, StateHeuristic};
use crate::mcts::mast::{MastPolicy, MastTable};
use crate::mcts::math;
use crate::mcts::termination::RolloutTracker;

pub enum RolloutPolicy<G: Game> {
    Random,
    Mast(MastPolicy),
    Agent(Box<dyn Agent<G>>),
}

impl<G: Game> RolloutPolicy<G> {
    pub fn from_kind(kind: RolloutKind, params: &MctsParams) -> Self {
        match kind {
            RolloutKind::Random => RolloutPolicy::Random,
            RolloutKind::Mast => RolloutPolicy::Mast(MastPolicy {
                temperature: params.mast_boltzmann,
                default_value: params.mast_default_value,
                heuristic_weight: params.mast_heuristic_weight,
            }),
        }
    }

    /// `actions` must not be empty.
    pub fn choose<R: RngCore>(
        &mut self,
        state: &G,
        mut actions: Vec<G::Action>,
        mast: &MastTable<G::Action>,
        heuristic: Option<&dyn ActionHeuristic<G>>,
        rng: &mut R,
    ) -> G::Action {
        match self {
            RolloutPolicy::Random => {
                let random_index = rng.gen_range(0..actions.len());
                actions.swap_remove(random_index)
            }
            RolloutPolicy::Mast(policy) => {
                let heuristics = heuristic
                    .filter(|_| policy.heuristic_weight > 0.0)
                    .map(|h| h.evaluate_all(&actions, state));
                let probabilities = policy.probabilities(mast, state.current_player(), &actions, heuristics.as_deref());
                let index = math::sample_from(&probabilities, rng);
                actions.swap_remove(index)
            }
            RolloutPolicy::Agent(agent) => agent.choose(state, &actions, rng),
        }
    }
}

/// The rollout policy for the searching player and the one modelling everyone else.
pub struct RolloutPolicies<G: Game> {
    pub own: RolloutPolicy<G>,
    pub opponents: RolloutPolicy<G>,
}

impl<G: Game> RolloutPolicies<G> {
    pub fn from_params(params: &MctsParams) -> Self {
        RolloutPolicies {
            own: RolloutPolicy::from_kind(params.rollout, params),
            opponents: RolloutPolicy::from_kind(params.opponent_rollout, params),
        }
    }

    pub fn for_player(&mut self, player: usize, root_player: usize) -> &mut RolloutPolicy<G> {
        if player == root_player { &mut self.own } else { &mut self.opponents }
    }
}

/// Applies one action, mapping a game model failure into a search error.
pub(crate) fn advance<G: Game, R: Rng + ?Sized>(state: &G, action: G::Action, rng: &mut R) -> Result<G> {
    state
        .apply_action(action, rng)
        .map_err(|e| SearchError::GameModel(format!("{:?}", e)))
}

pub struct RolloutContext<'a, G: Game> {
    pub policies: &'a mut RolloutPolicies<G>,
    pub mast: &'a MastTable<G::Action>,
    pub action_heuristic: Option<&'a dyn ActionHeuristic<G>>,
    pub root_player: usize,
}

/// Plays on from `state` until `tracker` stops it, returning the final state and the moves made.
pub fn rollout<G: Game, R: RngCore>(
    state: G,
    tracker: &mut RolloutTracker,
    context: &mut RolloutContext<G>,
    rng: &mut R,
) -> Result<(G, Vec<(usize, G::Action)>)> {
    let mut game = state;
    let mut played = Vec::new();

    while !tracker.finished(&game) {
        let actions = game.actions();
        if actions.is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        let player = game.current_player();
        let action = context
            .policies
            .for_player(player, context.root_player)
            .choose(&game, actions, context.mast, context.action_heuristic, rng);

        tracker.record(&game);
        played.push((player, action.clone()));
        game = advance(&game, action, rng)?;
    }

    Ok((game, played))
}

/// The game's own score when terminal, otherwise the state heuristic (zero without one).
pub fn final_reward<G: Game>(state: &G, heuristic: Option<&dyn StateHeuristic<G>>) -> Result<Vec<f64>> {
    let reward = match state.rewards() {
        Some(reward) => reward,
        None => match heuristic {
            Some(heuristic) => (0..state.num_players()).map(|p| heuristic.evaluate(state, p)).collect(),
            None => vec![0.0; state.num_players()],
        },
    };

    if reward.iter().any(|v| !v.is_finite()) {
        return Err(SearchError::InvalidReward);
    }
    Ok(reward)
}
