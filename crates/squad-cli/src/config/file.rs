use crate::error::{CliError, Result};
use serde::Deserialize;
use squadopt::core::models::mode::GameMode;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileSolverConfig {
    #[serde(rename = "num-workers")]
    pub num_workers: Option<usize>,
    pub seed: Option<u64>,
    #[serde(rename = "exhaustive-limit")]
    pub exhaustive_limit: Option<u64>,
    #[serde(rename = "time-limit-ms")]
    pub time_limit_ms: Option<u64>,
}

/// One layer of optional settings. Used both for the `--config` file and for the
/// `-S` overrides applied on top of everything else.
///
/// ```toml
/// mode = "wvw"
///
/// [solver]
/// num-workers = 4
/// time-limit-ms = 5000
///
/// [weights]
/// quickness = 2.0
/// dup_penalty_global = 1.0
///
/// [targets]
/// stability = 0.4
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<GameMode>,
    pub solver: Option<FileSolverConfig>,
    pub weights: Option<BTreeMap<String, f64>>,
    pub targets: Option<BTreeMap<String, f64>>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
