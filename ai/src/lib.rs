mod agent;
mod config;
mod error;
mod game;
mod heuristics;
pub mod mcts;

pub use agent::{Agent, RandomAgent};
pub use config::{
    BackupPolicy, Budget, FinalSelection, Information, MastMode, MctsParams, OmaMode, RolloutIncrement, RolloutKind,
    RolloutTermination, Structure, TreePolicy,
};
pub use error::{Result, SearchError};
pub use game::{Game, Outcome};
pub use heuristics::{ActionHeuristic, StateHeuristic, TerminalScore};

pub use mcts::{MctsPlayer, SearchTree};
