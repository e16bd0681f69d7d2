use super::builder::SquadModel;
use super::extract::Placement;
use super::model::VarId;
use super::roster::ResolvedRoster;
use crate::core::capability::Boon;
use crate::core::models::objective::{BoonTargets, SCALE};
use std::collections::BTreeMap;

/// Objective units that map to a score of `1.0` per group.
const SCORE_UNITS_PER_GROUP: f64 = SCALE as f64 * 10.0;

/// `clamp(objective / (1000 * group_count * 10), 0, 1)`.
pub fn normalized_score(objective: i64, group_count: usize) -> f64 {
    let denominator = SCORE_UNITS_PER_GROUP * group_count.max(1) as f64;
    (objective as f64 / denominator).clamp(0.0, 1.0)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(0.0, 1.0)
}

/// Per-group coverage read from the solved aggregation variables.
///
/// Uses `c / cap` where a saturated variable exists. Unweighted boons have none, so
/// their raw sum `u` is read against the same cap, matching [`fallback_coverage`].
pub fn solved_coverage(squad: &SquadModel, values: &[i64]) -> Vec<BTreeMap<Boon, f64>> {
    let value_of = |v: VarId| values.get(v.index()).copied().unwrap_or(0) as f64;

    squad
        .groups
        .iter()
        .map(|group| {
            Boon::ALL
                .iter()
                .map(|&boon| {
                    let coverage = match group.saturated.get(&boon) {
                        Some(&c) => ratio(value_of(c), squad.caps[&boon] as f64),
                        None => ratio(value_of(group.uptime[&boon]), squad.caps[&boon] as f64),
                    };
                    (boon, coverage)
                })
                .collect()
        })
        .collect()
}

/// Per-group coverage computed straight from capability vectors, for the fallback path.
pub fn fallback_coverage(
    roster: &ResolvedRoster,
    placements: &[Placement],
    targets: &BoonTargets,
) -> Vec<BTreeMap<Boon, f64>> {
    let mut sums = vec![[0.0f64; Boon::ALL.len()]; roster.group_count];
    for placement in placements {
        let capability = &roster.builds[placement.build].capability;
        for (slot, &boon) in Boon::ALL.iter().enumerate() {
            sums[placement.group][slot] += capability.boon(boon);
        }
    }

    sums.iter()
        .map(|group| {
            Boon::ALL
                .iter()
                .enumerate()
                .map(|(slot, &boon)| {
                    let units = (group[slot] * SCALE as f64).round();
                    (boon, ratio(units, targets.cap(boon) as f64))
                })
                .collect()
        })
        .collect()
}
