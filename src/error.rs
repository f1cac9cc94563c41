use thiserror::Error;

/// Failure taxonomy for one analysis run.
///
/// `Validation` and `Dependency` abort the run. `ModelCall` and `Structuring`
/// are absorbed inside the summarizer and only ever reach the logs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Unusable input: unparsable subtitles, zero segments after filtering.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Embedding model, nearest-neighbor index or clustering backend unavailable.
    #[error("dependency unavailable: {0}")]
    Dependency(String),

    /// A single language-model call failed.
    #[error("language model call failed: {0}")]
    ModelCall(String),

    /// The final report could not be produced or decoded.
    #[error("report structuring failed: {0}")]
    Structuring(String),
}

impl AnalysisError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::Validation(_) | AnalysisError::Dependency(_))
    }

    /// Wraps a provider error chain, keeping every context layer in the message.
    pub fn dependency(err: anyhow::Error) -> Self {
        AnalysisError::Dependency(format!("{:#}", err))
    }

    pub fn model_call(err: anyhow::Error) -> Self {
        AnalysisError::ModelCall(format!("{:#}", err))
    }
}
