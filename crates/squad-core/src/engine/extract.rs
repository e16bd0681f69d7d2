use super::builder::SquadModel;
use super::model::VarId;
use super::roster::ResolvedRoster;
use crate::core::models::result::GroupAssignment;

/// Where one player ended up: a build index into the roster and a group index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub build: usize,
    pub group: usize,
}

/// Reads placements out of a solver assignment, one per roster player.
///
/// The build is the first candidate (in declared order) whose decision variable is set,
/// else the first candidate. The group is the first set group variable, else group 0.
pub fn solved_placements(squad: &SquadModel, roster: &ResolvedRoster, values: &[i64]) -> Vec<Placement> {
    let is_set = |v: &VarId| values.get(v.index()).copied() == Some(1);

    roster
        .players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let chosen = squad.build_vars[i].iter().position(is_set).unwrap_or(0);
            let group = squad.group_vars[i].iter().position(is_set).unwrap_or(0);
            Placement {
                build: player.candidates[chosen],
                group,
            }
        })
        .collect()
}

/// The deterministic fallback: first candidate, group `index mod group_count`.
///
/// With `group_count = max(1, ceil(n / 5))` round-robin placement never puts more
/// than five players in one group.
pub fn fallback_placements(roster: &ResolvedRoster) -> Vec<Placement> {
    let k = roster.group_count.max(1);
    roster
        .players
        .iter()
        .enumerate()
        .map(|(i, player)| Placement {
            build: player.candidates[0],
            group: i % k,
        })
        .collect()
}

/// Groups `placements` into one [`GroupAssignment`] per group, players in roster order.
/// Every group id in `0..group_count` is present, even if empty.
pub fn into_groups(roster: &ResolvedRoster, placements: &[Placement]) -> Vec<GroupAssignment> {
    let mut groups: Vec<GroupAssignment> = (0..roster.group_count).map(GroupAssignment::new).collect();
    for (player, placement) in roster.players.iter().zip(placements) {
        groups[placement.group].push(player.id.clone(), roster.builds[placement.build].id.clone());
    }
    groups
}
