use thiserror::Error;

/// Errors raised by external providers (text extraction, embeddings,
/// linguistic tagging, summarization).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model error: {0}")]
    Model(String),

    #[error("provider timed out: {0}")]
    Timeout(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// True when the provider is absent or not configured, as opposed to
    /// having failed while doing work. Engines downgrade unavailable
    /// providers to an insufficient-data result instead of failing the stage.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ProviderError::Io(_) => "io_error",
            ProviderError::Model(_) => "model_error",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Unavailable(_) => "unavailable",
        }
    }
}

/// Main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{stage} provider failure: {source}")]
    Provider {
        stage: &'static str,
        #[source]
        source: ProviderError,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
