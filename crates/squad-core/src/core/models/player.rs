use super::ids::{BuildId, PlayerId};
use serde::{Deserialize, Serialize};

/// One roster slot and the builds it is willing to play, in order of preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub eligible_build_ids: Vec<BuildId>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            eligible_build_ids: Vec::new(),
        }
    }

    pub fn with_eligible<I, B>(mut self, builds: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BuildId>,
    {
        self.eligible_build_ids = builds.into_iter().map(Into::into).collect();
        self
    }
}
