use std::rc::Rc;
use std::time::{Duration, Instant};
use log::{debug, trace, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use crate::agent::Agent;
use crate::config::{Budget, MctsParams, Structure};
use crate::error::{Result, SearchError};
use crate::game::Game;
use crate::heuristics::{ActionHeuristic, StateHeuristic};
use crate::mcts::mast::MastTable;
use crate::mcts::multi_tree::MultiTreeSearch;
use crate::mcts::rollout::{RolloutPolicies, RolloutPolicy};
use crate::mcts::search::{Collaborators, Iteration};
use crate::mcts::statistics::{SearchStats, TreeStatistics};
use crate::mcts::transposition::{KeyFunction, StateKey};
use crate::mcts::tree::SearchTree;

/// The structure a search was run on, kept after the search for inspection and reuse.
pub enum Searcher<G: Game> {
    Tree(SearchTree<G>),
    Multi(MultiTreeSearch<G>),
}

impl<G: Game> Searcher<G> {
    /// The searching player's tree.
    pub fn tree(&self) -> Option<&SearchTree<G>> {
        match self {
            Searcher::Tree(tree) => Some(tree),
            Searcher::Multi(multi) => multi.root_tree(),
        }
    }
}

/// Runs budgeted searches and picks actions for real games.
pub struct MctsPlayer<G: Game> {
    params: MctsParams,
    rng: Pcg64,
    action_heuristic: Option<Rc<dyn ActionHeuristic<G>>>,
    state_heuristic: Option<Rc<dyn StateHeuristic<G>>>,
    key_function: Option<Rc<dyn KeyFunction<G>>>,
    policies: RolloutPolicies<G>,
    mast: Option<MastTable<G::Action>>,
    searcher: Option<Searcher<G>>,
    /// Real actions since the last decision, needed to carry a tree over.
    observed: Vec<(usize, G::Action)>,
    stats: SearchStats,
}

impl<G: Game> MctsPlayer<G> {
    pub fn new(params: MctsParams) -> Result<Self> {
        params.validate()?;

        Ok(MctsPlayer {
            rng: Pcg64::seed_from_u64(params.seed),
            policies: RolloutPolicies::from_params(&params),
            params,
            action_heuristic: None,
            state_heuristic: None,
            key_function: None,
            mast: None,
            searcher: None,
            observed: Vec::new(),
            stats: SearchStats::default(),
        })
    }

    pub fn with_action_heuristic<H: ActionHeuristic<G> + 'static>(mut self, heuristic: H) -> Self {
        self.action_heuristic = Some(Rc::new(heuristic));
        self
    }

    pub fn with_state_heuristic<H: StateHeuristic<G> + 'static>(mut self, heuristic: H) -> Self {
        self.state_heuristic = Some(Rc::new(heuristic));
        self
    }

    pub fn with_key_function<K: KeyFunction<G> + 'static>(mut self, key_function: K) -> Self {
        self.key_function = Some(Rc::new(key_function));
        self
    }

    /// Plays the searching player's rollout moves with `agent`.
    pub fn with_rollout_agent<A: Agent<G> + 'static>(mut self, agent: A) -> Self {
        self.policies.own = RolloutPolicy::Agent(Box::new(agent));
        self
    }

    /// Plays everyone else's rollout moves with `agent`.
    pub fn with_opponent_model<A: Agent<G> + 'static>(mut self, agent: A) -> Self {
        self.policies.opponents = RolloutPolicy::Agent(Box::new(agent));
        self
    }

    pub fn params(&self) -> &MctsParams {
        &self.params
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn searcher(&self) -> Option<&Searcher<G>> {
        self.searcher.as_ref()
    }

    /// The searching player's tree from the last search.
    pub fn tree(&self) -> Option<&SearchTree<G>> {
        self.searcher.as_ref().and_then(Searcher::tree)
    }

    pub fn mast(&self) -> Option<&MastTable<G::Action>> {
        self.mast.as_ref()
    }

    /// Reports a move made in the real game, ours included. Only needed with tree reuse.
    pub fn observe(&mut self, player: usize, action: G::Action) {
        if self.params.reuse_tree {
            self.observed.push((player, action));
        }
    }

    fn check_setup(&self) -> Result<()> {
        if self.params.needs_action_heuristic() && self.action_heuristic.is_none() {
            return Err(SearchError::InvalidConfiguration(
                "pUCT, progressive bias and seeded visits need an action heuristic".to_string(),
            ));
        }
        if self.params.structure.is_graph() && self.key_function.is_none() {
            return Err(SearchError::InvalidConfiguration("graph search needs a key function".to_string()));
        }
        Ok(())
    }

    /// Searches from `state` and returns the action to play.
    pub fn get_action(&mut self, state: &G) -> Result<G::Action> {
        self.check_setup()?;
        if state.is_terminal() {
            return Err(SearchError::GameOver);
        }
        let mut actions = state.actions();
        if actions.is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        if actions.len() == 1 {
            return Ok(actions.swap_remove(0));
        }

        self.search(state)?;

        let best = self.searcher.as_ref().and_then(Searcher::tree).and_then(|tree| tree.best_action(tree.root(), &mut self.rng));
        let action = match best {
            Some(action) if actions.contains(&action) => action,
            _ => {
                warn!("search produced no usable action, choosing at random");
                let random_index = self.rng.gen_range(0..actions.len());
                actions.swap_remove(random_index)
            }
        };

        debug!(
            "mcts: {} iterations ({} failed) in {:?}, chose {:?}",
            self.stats.iterations, self.stats.failed_iterations, self.stats.elapsed, action
        );
        if let Some(tree) = self.tree() {
            debug!("mcts tree: {}", TreeStatistics::new(tree));
        }
        Ok(action)
    }

    /// Runs one full budgeted search from `state`, leaving the result in `searcher()`.
    pub fn search(&mut self, state: &G) -> Result<&SearchStats> {
        self.check_setup()?;
        if state.is_terminal() {
            return Err(SearchError::GameOver);
        }
        if state.actions().is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        self.prepare_mast(state);
        let pruned_keys = self.prepare_searcher(state);

        self.stats = SearchStats { pruned_keys, ..Default::default() };
        let start = Instant::now();

        loop {
            let outcome = self.iteration(state);
            self.stats.iterations += 1;

            match outcome {
                Ok(iteration) => self.record(iteration),
                Err(e) => {
                    self.stats.failed_iterations += 1;
                    warn!("mcts iteration {} abandoned: {}", self.stats.iterations, e);
                }
            }

            if self.budget_spent(start.elapsed()) {
                break;
            }
        }

        self.stats.elapsed = start.elapsed();
        Ok(&self.stats)
    }

    fn budget_spent(&self, elapsed: Duration) -> bool {
        match self.params.budget {
            Budget::Iterations(n) => self.stats.iterations >= n,
            Budget::TimeMillis(ms) => {
                let budget = Duration::from_millis(ms);
                let remaining = budget.saturating_sub(elapsed);
                let average = elapsed / self.stats.iterations.max(1);
                remaining <= average * 2 || remaining <= Duration::from_millis(self.params.break_ms)
            }
        }
    }

    fn iteration(&mut self, state: &G) -> Result<Iteration<G::Action>> {
        let mast = self.mast.get_or_insert_with(|| MastTable::new(state.num_players()));
        let mut collaborators = Collaborators {
            policies: &mut self.policies,
            mast: &*mast,
            state_heuristic: self.state_heuristic.as_deref(),
            key_function: self.key_function.as_deref(),
        };

        match self.searcher.as_mut() {
            Some(Searcher::Tree(tree)) if tree.params.structure.is_graph() => tree.graph_iteration(&mut collaborators, &mut self.rng),
            Some(Searcher::Tree(tree)) => tree.tree_iteration(&mut collaborators, &mut self.rng),
            Some(Searcher::Multi(multi)) => multi.iteration(state, &mut collaborators, &mut self.rng),
            None => Err(SearchError::InvalidConfiguration("search structure missing".to_string())),
        }
    }

    fn record(&mut self, iteration: Iteration<G::Action>) {
        self.stats.tree_actions += iteration.tree_actions.len();
        self.stats.rollout_actions += iteration.rollout_actions.len();

        let mode = self.params.mast;
        if let Some(mast) = self.mast.as_mut() {
            if mode.records_tree() {
                mast.update_all(&iteration.tree_actions, &iteration.reward);
            }
            if mode.records_rollout() {
                mast.update_all(&iteration.rollout_actions, &iteration.reward);
            }
        }
        trace!("reward {:?}", iteration.reward);
    }

    /// The MAST table lives for one search, or is decayed into the next one.
    fn prepare_mast(&mut self, state: &G) {
        match self.mast.as_mut() {
            Some(mast) if self.params.mast_gamma > 0.0 => mast.decay(self.params.mast_gamma),
            _ => self.mast = Some(MastTable::new(state.num_players())),
        }
    }

    /// Builds the structure for this search, carrying the previous one over when allowed.
    fn prepare_searcher(&mut self, state: &G) -> Vec<StateKey> {
        let observed = std::mem::take(&mut self.observed);
        let previous = self.searcher.take().filter(|_| self.params.reuse_tree);
        let mut pruned = Vec::new();

        let searcher = match (self.params.structure, previous) {
            (Structure::MultiTree, Some(Searcher::Multi(mut multi))) => {
                if multi.advance_root(&observed, state) {
                    debug!("reusing multi-tree root");
                    Searcher::Multi(multi)
                } else {
                    Searcher::Multi(self.new_multi_tree(state))
                }
            }
            (Structure::MultiTree, _) => Searcher::Multi(self.new_multi_tree(state)),
            (structure, previous) if structure.is_graph() => {
                // check_setup guarantees the key function
                match (previous, self.key_function.as_deref()) {
                    (Some(Searcher::Tree(mut tree)), Some(key_function)) if tree.table.is_some() => {
                        pruned = tree.reroot(state, key_function);
                        debug!("graph reuse: pruned {} nodes, root has {} visits", pruned.len(), tree.node(tree.root()).visits());
                        Searcher::Tree(tree)
                    }
                    (_, Some(key_function)) => Searcher::Tree(self.new_tree(SearchTree::new_graph(state, self.params.clone(), key_function))),
                    (_, None) => Searcher::Tree(self.new_tree(SearchTree::new(state, self.params.clone()))),
                }
            }
            (_, Some(Searcher::Tree(mut tree))) => {
                if tree.advance_root(&observed, state) {
                    debug!("reusing tree, root has {} visits", tree.node(tree.root()).visits());
                    Searcher::Tree(tree)
                } else {
                    Searcher::Tree(self.new_tree(SearchTree::new(state, self.params.clone())))
                }
            }
            _ => Searcher::Tree(self.new_tree(SearchTree::new(state, self.params.clone()))),
        };

        self.searcher = Some(searcher);
        pruned
    }

    fn new_multi_tree(&self, state: &G) -> MultiTreeSearch<G> {
        MultiTreeSearch::new(state, self.params.clone(), self.action_heuristic.clone())
    }

    fn new_tree(&self, mut tree: SearchTree<G>) -> SearchTree<G> {
        tree.action_heuristic = self.action_heuristic.clone();
        tree
    }
}
