use super::ids::BuildId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A role template a player can bring to the squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildTemplate {
    pub id: BuildId,
    pub specialization: String,
}

impl BuildTemplate {
    pub fn new(id: impl Into<BuildId>, specialization: &str) -> Self {
        Self {
            id: id.into(),
            specialization: specialization.to_string(),
        }
    }
}

/// An ordered, indexable view over the caller-supplied build templates.
///
/// Catalogue order is stable: index `0` is the designated fallback build for players
/// without any usable eligibility. Duplicate ids resolve to their first occurrence.
#[derive(Debug, Clone)]
pub struct BuildCatalogue<'a> {
    builds: &'a [BuildTemplate],
    index: HashMap<&'a BuildId, usize>,
}

impl<'a> BuildCatalogue<'a> {
    pub fn new(builds: &'a [BuildTemplate]) -> Self {
        let mut index = HashMap::with_capacity(builds.len());
        for (idx, build) in builds.iter().enumerate() {
            if index.contains_key(&build.id) {
                debug!(build = %build.id, "Duplicate build id in catalogue; keeping first occurrence.");
                continue;
            }
            index.insert(&build.id, idx);
        }
        Self { builds, index }
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    pub fn index_of(&self, id: &BuildId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn fallback(&self) -> Option<&'a BuildTemplate> {
        self.builds.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a BuildTemplate)> + 'a {
        self.builds.iter().enumerate()
    }

    /// Catalogue indices of every build with the given specialization, case-insensitively.
    pub fn indices_for_specialization(&self, specialization: &str) -> Vec<usize> {
        self.builds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.specialization.eq_ignore_ascii_case(specialization))
            .map(|(idx, _)| idx)
            .collect()
    }
}
