use super::boon::Boon;
use serde::{Deserialize, Serialize};

/// Might is a stacking boon; a group never benefits from more than this many stacks.
pub const MAX_MIGHT_STACKS: f64 = 25.0;

/// What a single build contributes to its sub-group, already adjusted for game mode.
///
/// Boon uptimes, `damage` and `sustain` live in `[0, 1]`; `might` is measured in stacks
/// and lives in `[0, 25]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CapabilityVector {
    pub quickness: f64,
    pub alacrity: f64,
    pub fury: f64,
    pub protection: f64,
    pub stability: f64,
    pub resolution: f64,
    pub might: f64,
    pub damage: f64,
    pub sustain: f64,
}

impl CapabilityVector {
    pub fn boon(&self, boon: Boon) -> f64 {
        match boon {
            Boon::Quickness => self.quickness,
            Boon::Alacrity => self.alacrity,
            Boon::Fury => self.fury,
            Boon::Protection => self.protection,
            Boon::Stability => self.stability,
            Boon::Resolution => self.resolution,
        }
    }

    pub fn set_boon(&mut self, boon: Boon, value: f64) {
        let slot = match boon {
            Boon::Quickness => &mut self.quickness,
            Boon::Alacrity => &mut self.alacrity,
            Boon::Fury => &mut self.fury,
            Boon::Protection => &mut self.protection,
            Boon::Stability => &mut self.stability,
            Boon::Resolution => &mut self.resolution,
        };
        *slot = value;
    }

    pub fn with_boon(mut self, boon: Boon, value: f64) -> Self {
        self.set_boon(boon, value);
        self
    }

    /// Returns a copy with every field forced into its documented range.
    /// Non-finite values collapse to `0.0`.
    pub fn clamped(&self) -> Self {
        let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let mut out = Self {
            might: if self.might.is_finite() {
                self.might.clamp(0.0, MAX_MIGHT_STACKS)
            } else {
                0.0
            },
            damage: unit(self.damage),
            sustain: unit(self.sustain),
            ..Self::default()
        };
        for boon in Boon::ALL {
            out.set_boon(boon, unit(self.boon(boon)));
        }
        out
    }
}
