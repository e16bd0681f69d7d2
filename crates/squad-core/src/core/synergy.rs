use crate::core::models::build::BuildCatalogue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Specialization pairs known to work well inside one sub-group.
const DEFAULT_SYNERGY_TABLE: &[(&str, &str, f64)] = &[
    ("Firebrand", "Renegade", 1.0),
    ("Chronomancer", "Druid", 0.8),
    ("Herald", "Scrapper", 0.6),
    ("Firebrand", "Scourge", 0.5),
    ("Tempest", "Spellbreaker", 0.5),
    ("Mechanist", "Specter", 0.4),
];

/// A bonus for seeing two specializations together in the same group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SynergyRule {
    pub first: String,
    pub second: String,
    pub multiplier: f64,
}

impl SynergyRule {
    pub fn new(first: &str, second: &str, multiplier: f64) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            multiplier,
        }
    }
}

pub fn default_rules() -> Vec<SynergyRule> {
    DEFAULT_SYNERGY_TABLE
        .iter()
        .map(|&(a, b, m)| SynergyRule::new(a, b, m))
        .collect()
}

/// A synergy rule resolved to concrete catalogue indices, `build_a < build_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynergyPair {
    pub build_a: usize,
    pub build_b: usize,
    pub multiplier: f64,
}

/// Resolves `rules` against the catalogue.
///
/// Every build of the first specialization is paired with every distinct build of the
/// second. Rules whose multiplier lies outside `(0, 1]` are skipped, and when several
/// rules produce the same index pair the first one wins.
pub fn resolve(rules: &[SynergyRule], catalogue: &BuildCatalogue) -> Vec<SynergyPair> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::new();

    for rule in rules {
        if !(rule.multiplier > 0.0 && rule.multiplier <= 1.0) {
            debug!(
                first = %rule.first,
                second = %rule.second,
                multiplier = rule.multiplier,
                "Skipping synergy rule with out-of-range multiplier."
            );
            continue;
        }
        let firsts = catalogue.indices_for_specialization(&rule.first);
        let seconds = catalogue.indices_for_specialization(&rule.second);
        for &a in &firsts {
            for &b in &seconds {
                if a == b {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    pairs.push(SynergyPair {
                        build_a: key.0,
                        build_b: key.1,
                        multiplier: rule.multiplier,
                    });
                }
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::build::BuildTemplate;

    fn builds() -> Vec<BuildTemplate> {
        vec![
            BuildTemplate::new("quickbrand", "Firebrand"),
            BuildTemplate::new("alacren", "Renegade"),
            BuildTemplate::new("heal-brand", "Firebrand"),
            BuildTemplate::new("scourge", "Scourge"),
        ]
    }

    #[test]
    fn default_rules_resolve_against_catalogue() {
        let data = builds();
        let catalogue = BuildCatalogue::new(&data);
        let pairs = resolve(&default_rules(), &catalogue);

        assert!(pairs.contains(&SynergyPair {
            build_a: 0,
            build_b: 1,
            multiplier: 1.0
        }));
        assert!(pairs.contains(&SynergyPair {
            build_a: 1,
            build_b: 2,
            multiplier: 1.0
        }));
        assert!(pairs.contains(&SynergyPair {
            build_a: 0,
            build_b: 3,
            multiplier: 0.5
        }));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn duplicate_and_invalid_rules_are_ignored() {
        let data = builds();
        let catalogue = BuildCatalogue::new(&data);
        let rules = vec![
            SynergyRule::new("Renegade", "Firebrand", 0.7),
            SynergyRule::new("Firebrand", "Renegade", 0.2),
            SynergyRule::new("Scourge", "Renegade", 1.5),
            SynergyRule::new("Scourge", "Scourge", 0.3),
        ];
        let pairs = resolve(&rules, &catalogue);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.multiplier == 0.7));
    }

    #[test]
    fn same_specialization_pairs_need_distinct_builds() {
        let data = builds();
        let catalogue = BuildCatalogue::new(&data);
        let pairs = resolve(&[SynergyRule::new("Firebrand", "Firebrand", 0.4)], &catalogue);
        assert_eq!(
            pairs,
            vec![SynergyPair {
                build_a: 0,
                build_b: 2,
                multiplier: 0.4
            }]
        );
    }
}
