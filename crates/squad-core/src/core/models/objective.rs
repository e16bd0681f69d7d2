use crate::core::capability::Boon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point scale shared by every integer quantity in the optimization model.
pub const SCALE: i64 = 1000;

/// Stability is never sized beyond this uptime, whatever the caller asks for.
pub const STABILITY_TARGET_CEILING: f64 = 0.5;

/// Weights are clamped to `±MAX_WEIGHT` before scaling so that every objective
/// coefficient times a variable bound stays well inside `i64`.
pub const MAX_WEIGHT: f64 = 1e6;

const MIN_TARGET: f64 = 1.0 / SCALE as f64;

/// A named term of the weighted objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectiveTerm {
    Boon(Boon),
    Might,
    Dps,
    Sustain,
    DiversityReward,
    DupPenaltyGroup,
    DupPenaltyGlobal,
    Synergy,
}

impl ObjectiveTerm {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveTerm::Boon(boon) => boon.name(),
            ObjectiveTerm::Might => "might",
            ObjectiveTerm::Dps => "dps",
            ObjectiveTerm::Sustain => "sustain",
            ObjectiveTerm::DiversityReward => "diversity_reward",
            ObjectiveTerm::DupPenaltyGroup => "dup_penalty_group",
            ObjectiveTerm::DupPenaltyGlobal => "dup_penalty_global",
            ObjectiveTerm::Synergy => "synergy",
        }
    }
}

impl fmt::Display for ObjectiveTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown objective term: '{0}'")]
pub struct ParseObjectiveTermError(pub String);

impl FromStr for ObjectiveTerm {
    type Err = ParseObjectiveTermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let term = match key.as_str() {
            "might" => ObjectiveTerm::Might,
            "dps" | "damage" => ObjectiveTerm::Dps,
            "sustain" => ObjectiveTerm::Sustain,
            "diversity_reward" | "diversity" => ObjectiveTerm::DiversityReward,
            "dup_penalty_group" => ObjectiveTerm::DupPenaltyGroup,
            "dup_penalty_global" => ObjectiveTerm::DupPenaltyGlobal,
            "synergy" => ObjectiveTerm::Synergy,
            other => ObjectiveTerm::Boon(
                other
                    .parse()
                    .map_err(|_| ParseObjectiveTermError(s.to_string()))?,
            ),
        };
        Ok(term)
    }
}

/// Sparse objective weights. Terms that are absent weigh `0.0`.
///
/// Names that do not resolve to a known term are kept aside in [`unknown_keys`](Self::unknown_keys)
/// so callers can report them; they never influence the objective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ObjectiveWeights {
    weights: BTreeMap<ObjectiveTerm, f64>,
    unknown: Vec<String>,
}

impl ObjectiveWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, term: ObjectiveTerm, weight: f64) -> Self {
        self.set(term, weight);
        self
    }

    pub fn set(&mut self, term: ObjectiveTerm, weight: f64) {
        self.weights.insert(term, weight);
    }

    pub fn get(&self, term: ObjectiveTerm) -> f64 {
        self.weights.get(&term).copied().unwrap_or(0.0)
    }

    /// Weight clamped to `±MAX_WEIGHT`, multiplied by [`SCALE`] and rounded, as used
    /// in the integer objective.
    pub fn scaled(&self, term: ObjectiveTerm) -> i64 {
        (self.get(term).clamp(-MAX_WEIGHT, MAX_WEIGHT) * SCALE as f64).round() as i64
    }

    pub fn clamped_terms(&self) -> Vec<ObjectiveTerm> {
        self.weights
            .iter()
            .filter(|(_, w)| w.abs() > MAX_WEIGHT)
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown
    }

    pub fn negative_terms(&self) -> Vec<ObjectiveTerm> {
        self.weights
            .iter()
            .filter(|(_, w)| **w < 0.0)
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectiveTerm, f64)> + '_ {
        self.weights.iter().map(|(t, w)| (*t, *w))
    }

    /// Overlays `other` on top of `self`; terms present in `other` win.
    pub fn merged_with(&self, other: &ObjectiveWeights) -> ObjectiveWeights {
        let mut merged = self.clone();
        for (term, weight) in other.iter() {
            merged.set(term, weight);
        }
        merged.unknown.extend(other.unknown.iter().cloned());
        merged
    }
}

impl From<BTreeMap<String, f64>> for ObjectiveWeights {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let mut weights = ObjectiveWeights::new();
        for (key, value) in raw {
            match key.parse::<ObjectiveTerm>() {
                Ok(term) => weights.set(term, value),
                Err(_) => weights.unknown.push(key),
            }
        }
        weights
    }
}

impl From<ObjectiveWeights> for BTreeMap<String, f64> {
    fn from(weights: ObjectiveWeights) -> Self {
        weights
            .weights
            .into_iter()
            .map(|(term, w)| (term.name().to_string(), w))
            .collect()
    }
}

/// Per-boon uptime targets used to size the saturation caps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoonTargets {
    targets: BTreeMap<Boon, f64>,
}

impl BoonTargets {
    pub const DEFAULT_TARGET: f64 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, boon: Boon, target: f64) -> Self {
        self.targets.insert(boon, target);
        self
    }

    pub fn set(&mut self, boon: Boon, target: f64) {
        self.targets.insert(boon, target);
    }

    /// Effective target in `(0, 1]`; stability never exceeds [`STABILITY_TARGET_CEILING`].
    pub fn target(&self, boon: Boon) -> f64 {
        let requested = self
            .targets
            .get(&boon)
            .copied()
            .unwrap_or(Self::DEFAULT_TARGET);
        let requested = if requested.is_finite() {
            requested.clamp(MIN_TARGET, 1.0)
        } else {
            Self::DEFAULT_TARGET
        };
        match boon {
            Boon::Stability => requested.min(STABILITY_TARGET_CEILING),
            _ => requested,
        }
    }

    /// Saturation cap for `boon` in model units; always at least `1`.
    pub fn cap(&self, boon: Boon) -> i64 {
        ((self.target(boon) * SCALE as f64).round() as i64).max(1)
    }

    pub fn merged_with(&self, other: &BoonTargets) -> BoonTargets {
        let mut merged = self.clone();
        merged
            .targets
            .extend(other.targets.iter().map(|(b, t)| (*b, *t)));
        merged
    }
}
