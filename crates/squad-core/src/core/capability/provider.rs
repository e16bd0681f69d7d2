use super::vector::CapabilityVector;
use crate::core::models::build::BuildTemplate;
use crate::core::models::mode::GameMode;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Supplies the mode-adjusted capability vector of a build.
///
/// Implementations must be total and side-effect free: every `(build, mode)` pair yields
/// a vector, possibly all zeros.
pub trait CapabilityProvider: Sync {
    fn capability(&self, build: &BuildTemplate, mode: GameMode) -> CapabilityVector;
}

impl<F> CapabilityProvider for F
where
    F: Fn(&BuildTemplate, GameMode) -> CapabilityVector + Sync,
{
    fn capability(&self, build: &BuildTemplate, mode: GameMode) -> CapabilityVector {
        self(build, mode)
    }
}

#[derive(Debug, Error)]
pub enum CapabilityLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CapabilityOverride {
    quickness: Option<f64>,
    alacrity: Option<f64>,
    fury: Option<f64>,
    protection: Option<f64>,
    stability: Option<f64>,
    resolution: Option<f64>,
    might: Option<f64>,
    damage: Option<f64>,
    sustain: Option<f64>,
}

impl CapabilityOverride {
    fn apply_to(&self, base: CapabilityVector) -> CapabilityVector {
        CapabilityVector {
            quickness: self.quickness.unwrap_or(base.quickness),
            alacrity: self.alacrity.unwrap_or(base.alacrity),
            fury: self.fury.unwrap_or(base.fury),
            protection: self.protection.unwrap_or(base.protection),
            stability: self.stability.unwrap_or(base.stability),
            resolution: self.resolution.unwrap_or(base.resolution),
            might: self.might.unwrap_or(base.might),
            damage: self.damage.unwrap_or(base.damage),
            sustain: self.sustain.unwrap_or(base.sustain),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CapabilityEntry {
    #[serde(flatten)]
    base: CapabilityOverride,
    #[serde(default)]
    modes: HashMap<GameMode, CapabilityOverride>,
}

/// A static capability provider backed by a TOML table.
///
/// Entries are keyed by build id, or by specialization name as a coarser default.
/// Each entry may carry per-mode overrides:
///
/// ```toml
/// [quickbrand]
/// quickness = 1.0
/// stability = 0.4
/// might = 4.0
///
/// [quickbrand.modes.wvw]
/// stability = 0.9
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    entries: HashMap<String, CapabilityEntry>,
}

impl CapabilityTable {
    pub fn load(path: &Path) -> Result<Self, CapabilityLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| CapabilityLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| CapabilityLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let entries: HashMap<String, CapabilityEntry> = toml::from_str(content)?;
        let entries = entries
            .into_iter()
            .map(|(key, entry)| (key.to_ascii_lowercase(), entry))
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_for(&self, build: &BuildTemplate) -> Option<&CapabilityEntry> {
        self.entries
            .get(&build.id.as_str().to_ascii_lowercase())
            .or_else(|| {
                self.entries
                    .get(&build.specialization.to_ascii_lowercase())
            })
    }
}

impl CapabilityProvider for CapabilityTable {
    fn capability(&self, build: &BuildTemplate, mode: GameMode) -> CapabilityVector {
        let Some(entry) = self.entry_for(build) else {
            return CapabilityVector::default();
        };
        let base = entry.base.apply_to(CapabilityVector::default());
        let adjusted = match entry.modes.get(&mode) {
            Some(overrides) => overrides.apply_to(base),
            None => base,
        };
        adjusted.clamped()
    }
}
