use super::model::ModelError;
use thiserror::Error;

/// Failures inside the engine. None of these escape the optimize workflow: the Solver
/// Driver turns them into an `UNKNOWN` status and the fallback path takes over.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid optimization model: {source}")]
    InvalidModel {
        #[from]
        source: ModelError,
    },

    #[error("Solver '{solver}' failed: {reason}")]
    Solver { solver: &'static str, reason: String },

    #[error("Solver panicked: {0}")]
    Panic(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
