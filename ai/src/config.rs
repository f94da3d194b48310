use serde::{Deserialize, Serialize};
use crate::error::{Result, SearchError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    Iterations(u32),
    TimeMillis(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreePolicy {
    Ucb,
    UcbTuned,
    AlphaGo,
    RegretMatching,
    Exp3,
    Greedy,
    Uniform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutTermination {
    Exact,
    StartAction,
    EndAction,
    EndTurn,
    EndRound,
}

/// What a rollout's depth is counted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutIncrement {
    Tick,
    Turn,
    Round,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    OneTree,
    MultiTree,
    Mcgs,
    /// Graph search whose keys also carry the player to move.
    McgsSelfOnly,
}

impl Structure {
    pub fn is_graph(&self) -> bool {
        matches!(self, Structure::Mcgs | Structure::McgsSelfOnly)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmaMode {
    Off,
    /// Pool statistics for the searching player's nodes only.
    SearchPlayer,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupPolicy {
    MonteCarlo,
    MaxMonteCarlo,
    Lambda,
    MaxLambda,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Information {
    OpenLoop,
    ClosedLoop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MastMode {
    Off,
    Rollout,
    Tree,
    Both,
}

impl MastMode {
    pub fn records_tree(&self) -> bool {
        matches!(self, MastMode::Tree | MastMode::Both)
    }

    pub fn records_rollout(&self) -> bool {
        matches!(self, MastMode::Rollout | MastMode::Both)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutKind {
    Random,
    Mast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalSelection {
    /// Most visited action.
    Robust,
    /// Highest mean value.
    Simple,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsParams {
    pub seed: u64,
    pub budget: Budget,
    pub break_ms: u64,
    pub information: Information,
    pub structure: Structure,
    pub reuse_tree: bool,
    pub max_tree_depth: u32,

    pub tree_policy: TreePolicy,
    pub k: f64,
    pub normalise_rewards: bool,
    pub first_play_urgency: f64,
    pub explore_epsilon: f64,
    pub exp3_boltzmann: f64,
    pub progressive_bias: f64,
    pub puct: bool,
    pub puct_temperature: f64,
    pub progressive_widening_constant: f64,
    pub progressive_widening_exponent: f64,
    pub initialise_visits: u32,
    pub action_heuristic_recalculation: u32,

    pub rollout: RolloutKind,
    pub opponent_rollout: RolloutKind,
    pub rollout_length: u32,
    pub rollout_length_per_player: bool,
    pub rollout_termination: RolloutTermination,
    pub rollout_increment: RolloutIncrement,

    pub mast: MastMode,
    pub mast_boltzmann: f64,
    pub mast_default_value: f64,
    /// Weight given to the action heuristic when scoring a MAST rollout move.
    pub mast_heuristic_weight: f64,
    /// Decay applied to the MAST table between decisions; 0 discards it.
    pub mast_gamma: f64,

    pub paranoid: bool,
    pub oma: OmaMode,
    /// Prior strength of the pooled OMA value; 0 disables blending it into selection.
    pub oma_visits: u32,

    pub backup_policy: BackupPolicy,
    pub max_backup_threshold: u32,
    pub backup_lambda: f64,

    pub final_selection: FinalSelection,
    pub noise_epsilon: f64,
}

impl Default for MctsParams {
    fn default() -> Self {
        MctsParams {
            seed: 0,
            budget: Budget::Iterations(1000),
            break_ms: 10,
            information: Information::OpenLoop,
            structure: Structure::OneTree,
            reuse_tree: false,
            max_tree_depth: 1000,

            tree_policy: TreePolicy::Ucb,
            k: 1.0,
            normalise_rewards: true,
            first_play_urgency: 1_000_000_000.0,
            explore_epsilon: 0.1,
            exp3_boltzmann: 0.1,
            progressive_bias: 0.0,
            puct: false,
            puct_temperature: 0.0,
            progressive_widening_constant: 0.0,
            progressive_widening_exponent: 0.0,
            initialise_visits: 0,
            action_heuristic_recalculation: 20,

            rollout: RolloutKind::Random,
            opponent_rollout: RolloutKind::Random,
            rollout_length: 10,
            rollout_length_per_player: false,
            rollout_termination: RolloutTermination::Exact,
            rollout_increment: RolloutIncrement::Tick,

            mast: MastMode::Off,
            mast_boltzmann: 0.1,
            mast_default_value: 0.0,
            mast_heuristic_weight: 0.0,
            mast_gamma: 0.0,

            paranoid: false,
            oma: OmaMode::Off,
            oma_visits: 30,

            backup_policy: BackupPolicy::MonteCarlo,
            max_backup_threshold: 1_000_000,
            backup_lambda: 1.0,

            final_selection: FinalSelection::Robust,
            noise_epsilon: 1e-6,
        }
    }
}

impl MctsParams {
    pub fn progressive_widening(&self) -> bool {
        self.progressive_widening_constant >= 1.0
    }

    /// Knobs that cannot work without an action heuristic.
    pub fn needs_action_heuristic(&self) -> bool {
        self.puct || self.progressive_bias > 0.0 || self.initialise_visits > 0
    }

    pub fn validate(&self) -> Result<()> {
        match self.budget {
            Budget::Iterations(0) | Budget::TimeMillis(0) => return Err(SearchError::InvalidBudget),
            _ => {}
        }

        let invalid = |msg: &str| Err(SearchError::InvalidConfiguration(msg.to_string()));

        if !self.k.is_finite() || self.k < 0.0 {
            return invalid("exploration constant must be finite and non-negative");
        }
        if !(0.0..=1.0).contains(&self.explore_epsilon) {
            return invalid("explore_epsilon must lie in [0, 1]");
        }
        if self.tree_policy == TreePolicy::Exp3 && self.exp3_boltzmann <= 0.0 {
            return invalid("exp3_boltzmann must be positive");
        }
        if self.puct_temperature < 0.0 {
            return invalid("puct_temperature must be non-negative");
        }
        if self.progressive_widening() && self.progressive_widening_exponent < 0.0 {
            return invalid("progressive_widening_exponent must be non-negative");
        }
        if self.rollout == RolloutKind::Mast || self.opponent_rollout == RolloutKind::Mast {
            if self.mast == MastMode::Off {
                return invalid("a MAST rollout needs mast recording switched on");
            }
            if self.mast_boltzmann <= 0.0 {
                return invalid("mast_boltzmann must be positive");
            }
        }
        if !(0.0..=1.0).contains(&self.mast_heuristic_weight) {
            return invalid("mast_heuristic_weight must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.mast_gamma) {
            return invalid("mast_gamma must lie in [0, 1]");
        }
        if self.oma != OmaMode::Off && self.structure != Structure::OneTree {
            return invalid("opponent move abstraction needs the single tree structure");
        }
        if !(0.0..=1.0).contains(&self.backup_lambda) {
            return invalid("backup_lambda must lie in [0, 1]");
        }
        if self.max_tree_depth == 0 {
            return invalid("max_tree_depth must be at least 1");
        }
        Ok(())
    }
}
