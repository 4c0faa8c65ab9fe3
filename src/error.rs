use std::io;

/// All error types for the decimation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum DecimateError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("Precondition failed: {0}")]
    Precondition(String),
    #[error("Transform error: {0}")]
    Transform(String),
    #[error("Simplification error: {0}")]
    Simplify(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecimateError>;
