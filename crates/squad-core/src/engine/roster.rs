use crate::core::capability::{CapabilityProvider, CapabilityVector};
use crate::core::models::build::{BuildCatalogue, BuildTemplate};
use crate::core::models::ids::{BuildId, PlayerId};
use crate::core::models::request::OptimizationRequest;
use crate::core::synergy::{self, SynergyPair};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Maximum number of players in one sub-group.
pub const GROUP_CAPACITY: usize = 5;

/// Id of the build synthesized when neither eligibility nor the catalogue offers one.
pub const PLACEHOLDER_BUILD_ID: &str = "unassigned";

/// `max(1, ceil(players / GROUP_CAPACITY))`.
pub fn group_count_for(players: usize) -> usize {
    players.div_ceil(GROUP_CAPACITY).max(1)
}

/// A build the model may assign, with its capability already looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEntry {
    pub id: BuildId,
    pub specialization: Option<String>,
    pub capability: CapabilityVector,
    pub in_catalogue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPlayer {
    pub id: PlayerId,
    /// Indices into [`ResolvedRoster::builds`], in the player's declared order.
    pub candidates: Vec<usize>,
    /// The player had no usable eligibility and was given the fallback build.
    pub substituted: bool,
}

/// A request with every id resolved to an index and every capability looked up.
///
/// Build indices are stable: catalogue builds come first in catalogue order (duplicates
/// collapsed onto their first occurrence), followed by eligible ids the catalogue does not
/// know and, if needed, the placeholder build.
#[derive(Debug, Clone)]
pub struct ResolvedRoster {
    pub builds: Vec<BuildEntry>,
    pub players: Vec<RosterPlayer>,
    pub group_count: usize,
    /// Synergy pairs over `builds` indices, `build_a < build_b`.
    pub synergies: Vec<SynergyPair>,
}

impl ResolvedRoster {
    pub fn resolve<P>(request: &OptimizationRequest, provider: &P) -> Self
    where
        P: CapabilityProvider + ?Sized,
    {
        let catalogue = BuildCatalogue::new(&request.builds);
        let mut builds = Vec::with_capacity(catalogue.len());
        let mut by_id: HashMap<BuildId, usize> = HashMap::with_capacity(catalogue.len());
        let mut catalogue_to_build = Vec::with_capacity(catalogue.len());

        for (idx, template) in catalogue.iter() {
            let first = catalogue.index_of(&template.id).unwrap_or(idx);
            if first != idx {
                catalogue_to_build.push(catalogue_to_build[first]);
                continue;
            }
            by_id.insert(template.id.clone(), builds.len());
            catalogue_to_build.push(builds.len());
            builds.push(BuildEntry {
                id: template.id.clone(),
                specialization: Some(template.specialization.clone()),
                capability: provider.capability(template, request.mode).clamped(),
                in_catalogue: true,
            });
        }

        let mut intern = |id: &BuildId, builds: &mut Vec<BuildEntry>| -> usize {
            if let Some(&idx) = by_id.get(id) {
                return idx;
            }
            debug!(build = %id, "Eligible build is not in the catalogue; adding it as an ad-hoc entry.");
            let template = BuildTemplate::new(id.clone(), "");
            builds.push(BuildEntry {
                id: id.clone(),
                specialization: None,
                capability: provider.capability(&template, request.mode).clamped(),
                in_catalogue: false,
            });
            by_id.insert(id.clone(), builds.len() - 1);
            builds.len() - 1
        };

        let mut players = Vec::with_capacity(request.players.len());
        for player in &request.players {
            let mut candidates = Vec::with_capacity(player.eligible_build_ids.len());
            for id in &player.eligible_build_ids {
                let idx = intern(id, &mut builds);
                if !candidates.contains(&idx) {
                    candidates.push(idx);
                }
            }
            let substituted = candidates.is_empty();
            if substituted {
                let fallback = match catalogue.fallback() {
                    Some(template) => intern(&template.id, &mut builds),
                    None => intern(&BuildId::new(PLACEHOLDER_BUILD_ID), &mut builds),
                };
                debug!(player = %player.id, build = %builds[fallback].id, "Player has no eligible builds; substituting the fallback build.");
                candidates.push(fallback);
            }
            players.push(RosterPlayer {
                id: player.id.clone(),
                candidates,
                substituted,
            });
        }

        let rules = request.synergies.clone().unwrap_or_else(synergy::default_rules);
        let mut seen = HashSet::new();
        let synergies: Vec<SynergyPair> = synergy::resolve(&rules, &catalogue)
            .into_iter()
            .filter_map(|pair| {
                let a = catalogue_to_build[pair.build_a];
                let b = catalogue_to_build[pair.build_b];
                let key = (a.min(b), a.max(b));
                (a != b && seen.insert(key)).then_some(SynergyPair {
                    build_a: key.0,
                    build_b: key.1,
                    multiplier: pair.multiplier,
                })
            })
            .collect();

        let roster = Self {
            group_count: group_count_for(players.len()),
            builds,
            players,
            synergies,
        };
        info!(
            players = roster.players.len(),
            builds = roster.builds.len(),
            groups = roster.group_count,
            synergies = roster.synergies.len(),
            substituted = roster.players.iter().filter(|p| p.substituted).count(),
            "Roster resolved."
        );
        roster
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn substituted_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.substituted)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Builds that are a candidate for at least one player, ascending.
    pub fn used_builds(&self) -> Vec<usize> {
        let mut used: Vec<usize> = self
            .players
            .iter()
            .flat_map(|p| p.candidates.iter().copied())
            .collect();
        used.sort_unstable();
        used.dedup();
        used
    }
}
