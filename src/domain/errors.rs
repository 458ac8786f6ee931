use thiserror::Error;

/// Domain-level errors shared across application components.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The incoming payload missed a required field or violated invariants.
    #[error("validation error: {0}")]
    Validation(String),

    /// Input exceeded guard rails such as maximum length or count.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// No embedding engine is configured for the requested operation.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Vector incompatibility (e.g., dimension mismatch) or inference failure.
    #[error("embedding mismatch: {0}")]
    Embedding(String),

    /// The generation provider reported a failure.
    #[error("generation provider error: {0}")]
    Generation(String),

    /// The generation provider did not answer before the deadline.
    #[error("generation timed out after {0} ms")]
    GenerationTimeout(u64),

    /// The provider answered but the output lacks the required structure.
    #[error("malformed generation output: {0}")]
    MalformedOutput(String),

    /// Knowledge table could not be loaded or is inconsistent.
    #[error("knowledge base error: {0}")]
    Knowledge(String),

    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Any other unexpected failure.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn limit(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    pub fn embedding_unavailable(msg: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedOutput(msg.into())
    }

    pub fn knowledge(msg: impl Into<String>) -> Self {
        Self::Knowledge(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
