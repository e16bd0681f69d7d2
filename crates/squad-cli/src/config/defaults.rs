use squadopt::core::models::request::DEFAULT_TIME_LIMIT_MS;
use squadopt::engine::config::{DEFAULT_EXHAUSTIVE_LIMIT, DEFAULT_NUM_WORKERS, DEFAULT_SEED};

pub struct DefaultsConfig {
    pub num_workers: usize,
    pub seed: u64,
    pub exhaustive_limit: u64,
    pub time_limit_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            seed: DEFAULT_SEED,
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
        }
    }
}
