//! Error types for the analysis pipeline.

use themecut_models::ModelError;
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while segmenting, scoring or sequencing.
///
/// Degraded embedding capability is deliberately not represented here; it
/// is a structured warning on the score artifact, since the pipeline can
/// still run end-to-end with a placeholder backend. Empty results are plain
/// empty vectors, never errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding backend failed: {0}")]
    EmbeddingFailed(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AnalysisError {
    /// Create an input validation error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration validation error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an embedding backend error.
    pub fn embedding_failed(message: impl Into<String>) -> Self {
        Self::EmbeddingFailed(message.into())
    }
}
