use thiserror::Error;

/// Errors produced by training, artifact handling, and inference.
///
/// `Validation` is the only variant callers should surface as a
/// client-side failure; everything else is an internal fault.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("training failed: {0}")]
    Training(String),

    #[error("model artifact error: {0}")]
    Artifact(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("artifact encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("artifact decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// True when the error was caused by bad caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
