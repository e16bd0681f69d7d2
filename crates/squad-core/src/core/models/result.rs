use super::ids::{BuildId, PlayerId};
use crate::core::capability::Boon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome reported by a solver engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    /// Whether the status comes with a usable variable assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Always `complete`: callers tell degraded outcomes apart through [`Diagnostics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    #[default]
    Complete,
}

/// Members of one sub-group; `players[i]` plays `builds[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupAssignment {
    pub group_id: usize,
    pub players: Vec<PlayerId>,
    pub builds: Vec<BuildId>,
}

impl GroupAssignment {
    pub fn new(group_id: usize) -> Self {
        Self {
            group_id,
            players: Vec::new(),
            builds: Vec::new(),
        }
    }

    pub fn push(&mut self, player: PlayerId, build: BuildId) {
        self.players.push(player);
        self.builds.push(build);
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = (&PlayerId, &BuildId)> {
        self.players.iter().zip(self.builds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Diagnostics {
    pub solver_status: SolveStatus,
    pub fallback_used: bool,
    pub incumbents_reported: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<i64>,
    pub group_count: usize,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub num_workers: usize,
    pub time_limit_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substituted_players: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_error: Option<String>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            solver_status: SolveStatus::Unknown,
            fallback_used: false,
            incumbents_reported: 0,
            objective_value: None,
            group_count: 0,
            num_variables: 0,
            num_constraints: 0,
            num_workers: 0,
            time_limit_ms: 0,
            substituted_players: Vec::new(),
            solver_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptimizationResult {
    pub status: ResultStatus,
    pub best_score: f64,
    pub elapsed_ms: u64,
    pub groups: Vec<GroupAssignment>,
    pub coverage_by_group: Vec<BTreeMap<Boon, f64>>,
    pub diagnostics: Diagnostics,
}

impl OptimizationResult {
    /// The trivial result for an empty roster.
    pub fn empty() -> Self {
        Self {
            status: ResultStatus::Complete,
            best_score: 0.0,
            elapsed_ms: 0,
            groups: Vec::new(),
            coverage_by_group: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Flattened `(player, build, group)` triples in group order.
    pub fn assignments(&self) -> Vec<(&PlayerId, &BuildId, usize)> {
        self.groups
            .iter()
            .flat_map(|g| g.members().map(move |(p, b)| (p, b, g.group_id)))
            .collect()
    }

    pub fn build_of(&self, player: &PlayerId) -> Option<&BuildId> {
        self.assignments()
            .into_iter()
            .find(|(p, _, _)| *p == player)
            .map(|(_, b, _)| b)
    }
}
