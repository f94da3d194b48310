use std::fs;
use std::path::PathBuf;
use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use ai::{Budget, MctsParams, MctsPlayer, RandomAgent};

mod arena;
mod games;

use arena::Seat;
use games::{Demo, Nim, Pig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GameKind {
    Nim,
    Pig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Opponent {
    Random,
    /// Same search parameters as the candidate, default exploration constant.
    Mcts,
}

/// Plays a search player against a table of opponents and reports how it fared.
#[derive(Parser, Debug)]
#[command(name = "mcts-explorer", version, about)]
struct Args {
    /// JSON file with search parameters; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = GameKind::Nim)]
    game: GameKind,

    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Games per setting.
    #[arg(long, default_value_t = 20)]
    games: usize,

    /// Overrides the seed from the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the budget from the config file with an iteration count.
    #[arg(long)]
    iterations: Option<u32>,

    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,

    /// Exploration constants to compare, e.g. `--sweep-k 0.5,1,2`.
    #[arg(long, value_delimiter = ',')]
    sweep_k: Vec<f64>,
}

fn load_params(args: &Args) -> Result<MctsParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => MctsParams::default(),
    };

    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(iterations) = args.iterations {
        params.budget = Budget::Iterations(iterations);
    }
    params.validate()?;
    Ok(params)
}

fn search_seat<G: Demo>(params: &MctsParams, seed: u64) -> Result<Seat<G>> {
    let params = MctsParams { seed, ..params.clone() };
    Ok(Seat::Mcts(Box::new(G::equip(MctsPlayer::new(params)?))))
}

/// Builds the table for one game: the candidate at `candidate`, opponents everywhere else.
fn seats<G: Demo>(args: &Args, candidate_params: &MctsParams, opponent_params: &MctsParams, game: usize, candidate: usize) -> Result<Vec<Seat<G>>> {
    (0..args.players)
        .map(|p| {
            let seed = candidate_params.seed.wrapping_add((game * args.players + p) as u64);
            if p == candidate {
                search_seat(candidate_params, seed)
            } else {
                match args.opponent {
                    Opponent::Random => Ok(Seat::Random(RandomAgent)),
                    Opponent::Mcts => search_seat(opponent_params, seed),
                }
            }
        })
        .collect()
}

fn run<G: Demo>(args: &Args, params: &MctsParams, start: G) -> Result<()> {
    let mut rng = Pcg64::seed_from_u64(params.seed);

    if args.sweep_k.is_empty() {
        let tally = arena::run_match(&start, args.games, |game, candidate| seats(args, params, params, game, candidate), &mut rng)?;
        println!("{:?} vs {:?}: {}", args.game, args.opponent, tally);
        return Ok(());
    }

    let opponent_params = MctsParams { k: MctsParams::default().k, ..params.clone() };
    for k in args.sweep_k.iter() {
        let candidate_params = MctsParams { k: *k, ..params.clone() };
        candidate_params.validate()?;
        info!("sweep: k = {}", k);

        let tally = arena::run_match(
            &start,
            args.games,
            |game, candidate| seats(args, &candidate_params, &opponent_params, game, candidate),
            &mut rng,
        )?;
        println!("k = {:>6.3}: {}", k, tally);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args = Args::parse();
    ensure!(args.players >= 1, "at least one player is needed");
    let params = load_params(&args)?;
    info!("{:?} with {} players, {} games per setting, budget {:?}", args.game, args.players, args.games, params.budget);

    match args.game {
        GameKind::Nim => run(&args, &params, Nim::new(args.players, vec![3, 4, 5], 3)),
        GameKind::Pig => run(&args, &params, Pig::new(args.players, 30)),
    }
}
