use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Community shorthands accepted wherever a boon is named by a string.
static BOON_ALIASES: Map<&'static str, &'static str> = phf_map! {
    "quick" => "quickness",
    "qness" => "quickness",
    "alac" => "alacrity",
    "alacrity" => "alacrity",
    "quickness" => "quickness",
    "fury" => "fury",
    "prot" => "protection",
    "protection" => "protection",
    "stab" => "stability",
    "stability" => "stability",
    "reso" => "resolution",
    "resolution" => "resolution",
};

/// A tracked buff whose group uptime the optimizer maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boon {
    Quickness,
    Alacrity,
    Fury,
    Protection,
    Stability,
    Resolution,
}

impl Boon {
    pub const ALL: [Boon; 6] = [
        Boon::Quickness,
        Boon::Alacrity,
        Boon::Fury,
        Boon::Protection,
        Boon::Stability,
        Boon::Resolution,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Boon::Quickness => "quickness",
            Boon::Alacrity => "alacrity",
            Boon::Fury => "fury",
            Boon::Protection => "protection",
            Boon::Stability => "stability",
            Boon::Resolution => "resolution",
        }
    }
}

impl fmt::Display for Boon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown boon: '{0}'")]
pub struct ParseBoonError(pub String);

impl FromStr for Boon {
    type Err = ParseBoonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let canonical = BOON_ALIASES
            .get(key.as_str())
            .ok_or_else(|| ParseBoonError(s.to_string()))?;
        Boon::ALL
            .into_iter()
            .find(|b| b.name() == *canonical)
            .ok_or_else(|| ParseBoonError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_parse() {
        for boon in Boon::ALL {
            assert_eq!(boon.name().parse::<Boon>(), Ok(boon));
        }
    }

    #[test]
    fn aliases_parse_case_insensitively() {
        assert_eq!("Quick".parse::<Boon>(), Ok(Boon::Quickness));
        assert_eq!("ALAC".parse::<Boon>(), Ok(Boon::Alacrity));
        assert_eq!(" stab".parse::<Boon>(), Ok(Boon::Stability));
        assert_eq!(
            "might".parse::<Boon>(),
            Err(ParseBoonError("might".to_string()))
        );
    }
}
