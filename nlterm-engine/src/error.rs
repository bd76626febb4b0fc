// ABOUTME: defines the error type shared by every engine component.
// ABOUTME: keeps submission rejections distinguishable from collaborator failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input is empty")]
    EmptyInput,

    #[error("a command is already being processed")]
    Busy,

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl EngineError {
    /// True for errors that reject a submission before anything happens.
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::EmptyInput | EngineError::Busy)
    }
}
