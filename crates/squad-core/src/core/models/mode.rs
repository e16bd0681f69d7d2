use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The content type a squad is being composed for.
///
/// Capability providers use the mode to adjust boon contributions (e.g. stability matters
/// far more in large-scale player-versus-player fights than in instanced content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Raid,
    Strike,
    Fractal,
    Wvw,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Raid,
        GameMode::Strike,
        GameMode::Fractal,
        GameMode::Wvw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Raid => "raid",
            GameMode::Strike => "strike",
            GameMode::Fractal => "fractal",
            GameMode::Wvw => "wvw",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown game mode: '{0}'")]
pub struct ParseGameModeError(pub String);

impl FromStr for GameMode {
    type Err = ParseGameModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raid" | "raids" => Ok(GameMode::Raid),
            "strike" | "strikes" => Ok(GameMode::Strike),
            "fractal" | "fractals" => Ok(GameMode::Fractal),
            "wvw" | "mcm" => Ok(GameMode::Wvw),
            _ => Err(ParseGameModeError(s.to_string())),
        }
    }
}
