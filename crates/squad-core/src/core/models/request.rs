use super::build::BuildTemplate;
use super::mode::GameMode;
use super::objective::{BoonTargets, ObjectiveWeights};
use super::player::Player;
use crate::core::synergy::SynergyRule;
use serde::{Deserialize, Serialize};

/// Smallest wall-clock budget the solver is ever given.
pub const MIN_TIME_LIMIT_MS: u64 = 100;

pub const DEFAULT_TIME_LIMIT_MS: u64 = 2_000;

fn default_time_limit_ms() -> u64 {
    DEFAULT_TIME_LIMIT_MS
}

/// Everything one optimizer call needs. Immutable for the duration of the solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptimizationRequest {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub builds: Vec<BuildTemplate>,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub targets: BoonTargets,
    #[serde(default)]
    pub weights: ObjectiveWeights,
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,
    /// Overrides the built-in synergy table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synergies: Option<Vec<SynergyRule>>,
}

impl Default for OptimizationRequest {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            builds: Vec::new(),
            mode: GameMode::default(),
            targets: BoonTargets::default(),
            weights: ObjectiveWeights::default(),
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            synergies: None,
        }
    }
}

impl OptimizationRequest {
    pub fn new(players: Vec<Player>, builds: Vec<BuildTemplate>) -> Self {
        Self {
            players,
            builds,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_targets(mut self, targets: BoonTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_synergies(mut self, rules: Vec<SynergyRule>) -> Self {
        self.synergies = Some(rules);
        self
    }

    /// The solver budget after applying the [`MIN_TIME_LIMIT_MS`] floor.
    pub fn effective_time_limit_ms(&self) -> u64 {
        self.time_limit_ms.max(MIN_TIME_LIMIT_MS)
    }
}
