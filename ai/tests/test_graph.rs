mod counter_game;
mod dice_race;
mod tictactoe;

use rand::SeedableRng;
use rand_pcg::Pcg64;
use ai::mcts::StateKey;
use ai::{Budget, Game, MctsParams, MctsPlayer, SearchTree, Structure};
use counter_game::CounterGame;
use dice_race::DiceRace;
use tictactoe::TicTacToe;

fn graph_params(structure: Structure, n: u32) -> MctsParams {
    MctsParams { structure, budget: Budget::Iterations(n), seed: 7, ..Default::default() }
}

fn board_key(state: &TicTacToe) -> String {
    state.key()
}

/// Marks are never removed, so a board can only lead to boards that keep all of its marks.
fn reachable(from: &str, to: &str) -> bool {
    from.chars().zip(to.chars()).all(|(a, b)| a == '.' || a == b)
}

fn assert_visits_conserved<G: Game>(tree: &SearchTree<G>) {
    for id in tree.node_ids() {
        let node = tree.node(id);
        assert_eq!(node.visits(), node.action_visit_total());
    }
}

#[test]
fn test_each_iteration_stops_at_a_new_node() {
    let mut player = MctsPlayer::new(graph_params(Structure::Mcgs, 9)).unwrap().with_key_function(board_key);
    player.search(&TicTacToe::default()).unwrap();

    let tree = player.tree().unwrap();
    let table = tree.transposition_table().unwrap();
    assert_eq!(table.len(), 10);
    assert_eq!(tree.len(), 10);

    let root = tree.node(tree.root());
    assert_eq!(root.visits(), 9);
    for (_, stats) in root.action_stats() {
        assert_eq!(stats.n_visits, 1);
    }
}

#[test]
fn test_graph_search_shares_transpositions() {
    let mut player = MctsPlayer::new(graph_params(Structure::Mcgs, 2000)).unwrap().with_key_function(board_key);
    player.search(&TicTacToe::default()).unwrap();

    let tree = player.tree().unwrap();
    let table = tree.transposition_table().unwrap();
    assert_eq!(tree.len(), table.len());
    assert!(table.len() <= 2001);
    assert_eq!(tree.node(tree.root()).visits(), 2000);
    assert_visits_conserved(tree);

    // every node is stored under the key of the state it stands for
    for key in table.keys() {
        let id = table.get(key).unwrap();
        assert_eq!(tree.node(id).key(), Some(key));
    }
}

#[test]
fn test_colliding_keys_do_not_break_search() {
    let params = graph_params(Structure::Mcgs, 50);
    let mut player = MctsPlayer::new(params).unwrap().with_key_function(|_: &TicTacToe| "same".to_string());
    player.search(&TicTacToe::default()).unwrap();

    let tree = player.tree().unwrap();
    assert_eq!(player.stats().failed_iterations, 0);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(tree.root()).visits(), 50);
}

#[test]
fn test_self_only_keys() {
    let mut player = MctsPlayer::new(graph_params(Structure::McgsSelfOnly, 300))
        .unwrap()
        .with_key_function(|state: &DiceRace| format!("{:?}/{}", state.positions, state.hops_this_turn));
    player.search(&DiceRace::new(2, 15)).unwrap();

    let tree = player.tree().unwrap();
    for id in tree.node_ids() {
        let node = tree.node(id);
        let key = node.key().unwrap();
        assert_eq!(key.player, Some(node.decision_player()));
    }
    assert_eq!(tree.node(tree.root()).key().unwrap().player, Some(0));
    assert_eq!(player.stats().failed_iterations, 0);
}

#[test]
fn test_graph_reuse_keeps_prior_visits() {
    let params = MctsParams { reuse_tree: true, ..graph_params(Structure::Mcgs, 200) };
    let mut player = MctsPlayer::new(params).unwrap().with_key_function(board_key);

    let mut rng = Pcg64::seed_from_u64(3);
    let mut state = TicTacToe::default();
    while !state.is_terminal() {
        if state.current_player() == 1 {
            let theirs = state.actions()[0];
            player.observe(1, theirs);
            state = state.play(theirs);
            continue;
        }

        let key = StateKey { player: None, repr: state.key() };
        let prior = player
            .tree()
            .and_then(|tree| tree.transposition_table().and_then(|t| t.get(&key)).map(|id| tree.node(id).visits()))
            .unwrap_or(0);

        if state.actions().len() == 1 {
            break;
        }
        player.search(&state).unwrap();
        let stats = player.stats().clone();
        let tree = player.tree().unwrap();
        let table = tree.transposition_table().unwrap();

        let expected = if stats.pruned_keys.contains(&key) { 200 } else { prior + 200 };
        assert_eq!(tree.node(tree.root()).visits(), expected);
        for pruned in stats.pruned_keys.iter().filter(|k| !reachable(&key.repr, &k.repr)) {
            assert!(!table.contains(pruned), "pruned key {:?} came back", pruned);
        }
        assert_eq!(tree.len(), table.len());

        let ours = tree.best_action(tree.root(), &mut rng).unwrap();
        player.observe(0, ours);
        state = state.play(ours);
    }
}

#[test]
fn test_graph_reuse_with_player_blind_keys() {
    let params = MctsParams { reuse_tree: true, ..graph_params(Structure::Mcgs, 300) };
    let mut player = MctsPlayer::new(params).unwrap().with_key_function(|state: &CounterGame| state.key());

    let mut rng = Pcg64::seed_from_u64(11);
    let mut state = CounterGame::new(12);
    while !state.is_terminal() {
        if state.current_player() == 1 {
            let theirs = state.actions()[0];
            player.observe(1, theirs);
            state = state.play(theirs);
            continue;
        }
        if state.actions().len() == 1 {
            break;
        }

        player.search(&state).unwrap();
        let tree = player.tree().unwrap();
        let table = tree.transposition_table().unwrap();

        // a total stored for the other player is replaced, never left behind
        assert_eq!(tree.len(), table.len());
        assert_eq!(tree.node(tree.root()).decision_player(), 0);
        assert_eq!(tree.node(tree.root()).depth(), 0);

        let ours = tree.best_action(tree.root(), &mut rng).unwrap();
        player.observe(0, ours);
        state = state.play(ours);
    }
}
