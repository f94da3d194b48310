pub mod backup;
pub mod mast;
pub mod math;
pub mod multi_tree;
pub mod node;
pub mod oma;
pub mod player;
pub mod rollout;
pub mod search;
pub mod selection;
pub mod statistics;
pub mod stats;
pub mod termination;
pub mod transposition;
pub mod tree;

pub use mast::{MastPolicy, MastStats, MastTable};
pub use multi_tree::MultiTreeSearch;
pub use node::{NodeId, OmaLink, OmaStats, TrajectoryStep, TreeNode};
pub use player::{MctsPlayer, Searcher};
pub use rollout::{RolloutPolicies, RolloutPolicy};
pub use search::{Collaborators, Iteration};
pub use statistics::{SearchStats, TreeStatistics};
pub use stats::{ActionStats, RewardRange};
pub use termination::RolloutTracker;
pub use transposition::{KeyFunction, StateKey, TranspositionTable};
pub use tree::SearchTree;
