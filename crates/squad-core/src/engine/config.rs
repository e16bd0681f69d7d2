use thiserror::Error;

/// Parallel search workers used when the caller does not say otherwise.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Search spaces with at most this many decision combinations are enumerated exactly.
pub const DEFAULT_EXHAUSTIVE_LIMIT: u64 = 20_000;

pub const DEFAULT_SEED: u64 = 0x5EED_2024;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub num_workers: usize,
    pub seed: u64,
    pub exhaustive_limit: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            seed: DEFAULT_SEED,
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
        }
    }
}

#[derive(Default)]
pub struct SolverConfigBuilder {
    num_workers: Option<usize>,
    seed: Option<u64>,
    exhaustive_limit: Option<u64>,
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_workers(mut self, workers: usize) -> Self {
        self.num_workers = Some(workers);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn exhaustive_limit(mut self, limit: u64) -> Self {
        self.exhaustive_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<SolverConfig, ConfigError> {
        let num_workers = self.num_workers.unwrap_or(DEFAULT_NUM_WORKERS);
        if num_workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_workers",
                reason: "at least one search worker is required".to_string(),
            });
        }
        Ok(SolverConfig {
            num_workers,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            exhaustive_limit: self.exhaustive_limit.unwrap_or(DEFAULT_EXHAUSTIVE_LIMIT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_defaults() {
        let config = SolverConfigBuilder::new().build().unwrap();
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn builder_applies_overrides() {
        let config = SolverConfigBuilder::new()
            .num_workers(2)
            .seed(7)
            .exhaustive_limit(0)
            .build()
            .unwrap();
        assert_eq!(config.num_workers, 2);
        assert_eq!(config.seed, 7);
        assert_eq!(config.exhaustive_limit, 0);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = SolverConfigBuilder::new().num_workers(0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "num_workers",
                ..
            }
        ));
    }
}
