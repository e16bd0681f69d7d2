use squadopt::core::models::request::OptimizationRequest;
use squadopt::engine::config::SolverConfig;
use std::path::PathBuf;

/// Everything the `optimize` command needs once all configuration layers are merged.
pub struct AppConfig {
    pub request: OptimizationRequest,
    pub solver: SolverConfig,
    pub output: Option<PathBuf>,
}
