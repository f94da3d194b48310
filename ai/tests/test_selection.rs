mod lmr_game;

use std::rc::Rc;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use ai::mcts::TrajectoryStep;
use ai::{ActionHeuristic, MctsParams, SearchTree, TreePolicy};
use lmr_game::{LmrAction, LmrGame, ALL};

const TOLERANCE: f64 = 1e-3;

fn heuristic() -> Rc<dyn ActionHeuristic<LmrGame>> {
    Rc::new(|action: &LmrAction, _: &LmrGame, _: &[LmrAction]| match action {
        LmrAction::Left => 0.3,
        LmrAction::Middle => 0.0,
        LmrAction::Right => 1.0,
    })
}

fn lmr_tree(params: MctsParams, heuristic: Option<Rc<dyn ActionHeuristic<LmrGame>>>) -> SearchTree<LmrGame> {
    let game = LmrGame::default();
    let mut tree = SearchTree::new(&game, params);
    if let Some(heuristic) = heuristic {
        tree = tree.with_action_heuristic(heuristic);
    }
    let root = tree.root();
    tree.prepare(root, &game);
    tree
}

fn visit(tree: &mut SearchTree<LmrGame>, action: LmrAction, reward: f64, times: u32) {
    let root = tree.root();
    for _ in 0..times {
        let step = TrajectoryStep { node: root, action, considered: ALL.to_vec() };
        tree.backup(&[step], &[reward]);
    }
}

/// Left once at -1.0, Middle five times at 0.5, Right four times at 0.4.
fn ten_visits(tree: &mut SearchTree<LmrGame>) {
    visit(tree, LmrAction::Left, -1.0, 1);
    visit(tree, LmrAction::Middle, 0.5, 5);
    visit(tree, LmrAction::Right, 0.4, 4);
}

fn assert_scores(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < TOLERANCE, "scores {:?}, expected {:?}", actual, expected);
    }
}

#[test]
fn test_ucb_without_normalisation() {
    let params = MctsParams { normalise_rewards: false, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);

    let root = tree.root();
    assert_scores(&tree.action_scores(root, &ALL), &[0.517, 1.179, 1.159]);

    let mut rng = Pcg64::seed_from_u64(1);
    for _ in 0..20 {
        // exploration never applies to UCB, so the choice is always the best score
        assert_eq!(tree.tree_policy_action(root, &ALL, true, &mut rng).unwrap(), LmrAction::Middle);
    }
}

#[test]
fn test_ucb_with_normalisation() {
    let mut tree = lmr_tree(MctsParams::default(), None);
    ten_visits(&mut tree);

    let root = tree.root();
    assert_eq!(tree.reward_range().low, -1.0);
    assert_eq!(tree.reward_range().high, 0.5);
    assert_scores(&tree.action_scores(root, &ALL), &[1.517, 1.679, 1.692]);

    let mut rng = Pcg64::seed_from_u64(2);
    assert_eq!(tree.tree_policy_action(root, &ALL, true, &mut rng).unwrap(), LmrAction::Right);
}

#[test]
fn test_progressive_bias() {
    let params = MctsParams { progressive_bias: 2.0, ..Default::default() };
    let mut tree = lmr_tree(params, Some(heuristic()));
    ten_visits(&mut tree);

    let root = tree.root();
    assert_scores(&tree.action_scores(root, &ALL), &[1.817, 1.679, 2.092]);

    let mut rng = Pcg64::seed_from_u64(3);
    assert_eq!(tree.tree_policy_action(root, &ALL, true, &mut rng).unwrap(), LmrAction::Right);
}

#[test]
fn test_first_play_urgency() {
    let params = MctsParams { normalise_rewards: false, first_play_urgency: 20_000.0, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    let root = tree.root();
    assert_scores(&tree.action_scores(root, &ALL), &[20_000.0, 20_000.0, 20_000.0]);

    visit(&mut tree, LmrAction::Middle, 1.0, 1);
    // ln(1) leaves no exploration term
    assert_scores(&tree.action_scores(root, &ALL), &[20_000.0, 1.0, 20_000.0]);
}

#[test]
fn test_puct_weights_scale_exploration() {
    let params = MctsParams { normalise_rewards: false, puct: true, ..Default::default() };
    let mut tree = lmr_tree(params, Some(heuristic()));
    ten_visits(&mut tree);

    let root = tree.root();
    let scores = tree.action_scores(root, &ALL);
    // weights are 0.3/1.3, 0 and 1/1.3
    assert_scores(&scores, &[-1.0 + 1.517 * 0.3 / 1.3, 0.5, 0.4 + 0.759 / 1.3]);

    let params = MctsParams { normalise_rewards: false, puct: true, puct_temperature: 1.0, ..Default::default() };
    let mut tree = lmr_tree(params, Some(heuristic()));
    ten_visits(&mut tree);
    let scores = tree.action_scores(tree.root(), &ALL);
    assert!(scores[1] > 0.5, "softmax gives Middle some weight");
}

#[test]
fn test_alpha_go_and_tuned_exploration() {
    let params = MctsParams { tree_policy: TreePolicy::AlphaGo, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);
    let scores = tree.action_scores(tree.root(), &ALL);
    assert!((scores[1] - (1.0 + 10f64.sqrt() / 6.0)).abs() < TOLERANCE);

    let params = MctsParams { tree_policy: TreePolicy::UcbTuned, normalise_rewards: false, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);
    // Middle has no variance, so the bound is capped at 1/4 over a range of 1.5
    let scores = tree.action_scores(tree.root(), &ALL);
    let expected = 0.5 + 1.5 * (10f64.ln() / 5.0 * 0.25).sqrt();
    assert!((scores[1] - expected).abs() < TOLERANCE, "{:?}", scores);
}

#[test]
fn test_greedy_and_uniform() {
    let params = MctsParams { tree_policy: TreePolicy::Greedy, explore_epsilon: 0.0, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);
    let mut rng = Pcg64::seed_from_u64(4);
    for _ in 0..20 {
        assert_eq!(tree.tree_policy_action(tree.root(), &ALL, true, &mut rng).unwrap(), LmrAction::Middle);
    }

    let params = MctsParams { tree_policy: TreePolicy::Uniform, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);
    assert_scores(&tree.action_scores(tree.root(), &ALL), &[1.0, 1.0, 1.0]);

    let mut counts = [0; 3];
    for _ in 0..900 {
        let action = tree.tree_policy_action(tree.root(), &ALL, true, &mut rng).unwrap();
        counts[ALL.iter().position(|a| *a == action).unwrap()] += 1;
    }
    assert!(counts.iter().all(|c| *c > 200), "{:?}", counts);
}

#[test]
fn test_regret_matching() {
    let params = MctsParams { tree_policy: TreePolicy::RegretMatching, explore_epsilon: 0.0, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);
    let root = tree.root();

    // node value is 0.31, so regrets are 0, 1.9 and 0.9
    assert_scores(&tree.action_scores(root, &ALL), &[0.0, 1.9, 0.9]);

    let mut rng = Pcg64::seed_from_u64(5);
    let mut counts = [0; 3];
    for _ in 0..1000 {
        let action = tree.tree_policy_action(root, &ALL, true, &mut rng).unwrap();
        counts[ALL.iter().position(|a| *a == action).unwrap()] += 1;
    }
    assert_eq!(counts[0], 0);
    assert!((620..=740).contains(&counts[1]), "{:?}", counts);
    assert!((260..=380).contains(&counts[2]), "{:?}", counts);

    // the running strategy was sampled on the tenth visit, when the regrets were already final
    let strategy = tree.node(root).regret_strategy();
    assert!((strategy[&LmrAction::Middle] - 1.9 / 2.8).abs() < TOLERANCE);

    let mut counts = [0; 3];
    for _ in 0..1000 {
        let action = tree.best_action(root, &mut rng).unwrap();
        counts[ALL.iter().position(|a| *a == action).unwrap()] += 1;
    }
    assert_eq!(counts[0], 0);
    assert!((620..=740).contains(&counts[1]), "{:?}", counts);
}

#[test]
fn test_regret_matching_with_exploration() {
    let params = MctsParams { tree_policy: TreePolicy::RegretMatching, explore_epsilon: 0.3, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);

    let mut rng = Pcg64::seed_from_u64(6);
    let mut counts = [0; 3];
    for _ in 0..1000 {
        let action = tree.tree_policy_action(tree.root(), &ALL, true, &mut rng).unwrap();
        counts[ALL.iter().position(|a| *a == action).unwrap()] += 1;
    }
    // a tenth of all choices are uniform picks of Left
    assert!((60..=140).contains(&counts[0]), "{:?}", counts);
    assert!(counts[1] > counts[2], "{:?}", counts);
}

#[test]
fn test_exp3_values() {
    let params = MctsParams { tree_policy: TreePolicy::Exp3, exp3_boltzmann: 0.8, ..Default::default() };
    let mut tree = lmr_tree(params, None);
    ten_visits(&mut tree);
    assert_scores(&tree.action_scores(tree.root(), &ALL), &[1.0, 3.490, 3.211]);
}

#[test]
fn test_progressive_widening_grows_with_visits() {
    let params = MctsParams {
        progressive_widening_constant: 1.0,
        progressive_widening_exponent: 0.5,
        ..Default::default()
    };
    let mut tree = lmr_tree(params, None);
    let root = tree.root();
    let mut rng = Pcg64::seed_from_u64(7);

    for visits in 0..12 {
        let candidates = tree.actions_to_consider(root);
        let expected = match visits {
            0..=3 => 1,
            4..=8 => 2,
            _ => 3,
        };
        assert_eq!(candidates.len(), expected, "after {} visits", visits);
        assert_eq!(candidates[..], ALL[..expected]);

        let action = tree.tree_policy_action(root, &candidates, true, &mut rng).unwrap();
        tree.backup(&[TrajectoryStep { node: root, action, considered: candidates }], &[0.5]);
    }

    let node = tree.node(root);
    assert_eq!(node.stats(&LmrAction::Left).unwrap().valid_visits, 12);
    assert_eq!(node.stats(&LmrAction::Middle).unwrap().valid_visits, 8);
    assert_eq!(node.stats(&LmrAction::Right).unwrap().valid_visits, 3);
}

#[test]
fn test_progressive_widening_follows_heuristic_order() {
    let params = MctsParams {
        progressive_widening_constant: 1.0,
        progressive_widening_exponent: 0.5,
        ..Default::default()
    };
    let tree = lmr_tree(params, Some(heuristic()));
    let root = tree.root();
    assert_eq!(tree.node(root).available_actions(), &[LmrAction::Right, LmrAction::Left, LmrAction::Middle]);
    assert_eq!(tree.actions_to_consider(root), vec![LmrAction::Right]);
}

#[test]
fn test_seeded_visits() {
    let params = MctsParams { initialise_visits: 5, normalise_rewards: false, ..Default::default() };
    let mut tree = lmr_tree(params, Some(heuristic()));
    let root = tree.root();

    let node = tree.node(root);
    assert_eq!(node.visits(), 15);
    assert_eq!(node.action_visit_total(), 15);
    let left = node.stats(&LmrAction::Left).unwrap();
    assert_eq!(left.n_visits, 5);
    assert_eq!(left.valid_visits, 5);
    assert!((left.mean(0) - 0.3).abs() < 1e-9);

    visit(&mut tree, LmrAction::Left, 0.9, 1);
    let node = tree.node(root);
    assert_eq!(node.visits(), node.action_visit_total());
    assert!((node.stats(&LmrAction::Left).unwrap().mean(0) - 0.4).abs() < 1e-9);
}
