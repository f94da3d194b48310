use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("no legal actions available in a non-terminal state")]
    NoLegalActions,

    #[error("cannot search from a terminal state")]
    GameOver,

    #[error("search budget must be greater than zero")]
    InvalidBudget,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // everything below is local to a single iteration
    #[error("game model rejected a transition: {0}")]
    GameModel(String),

    #[error("reward vector contains a non-finite value")]
    InvalidReward,
}

pub type Result<T> = std::result::Result<T, SearchError>;
