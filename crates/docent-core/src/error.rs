//! Docent error taxonomy.
//!
//! Every failure the pipeline can produce is a named variant, so callers
//! decide per kind whether to reject, degrade to a fallback answer, or
//! fail the request. Retrieval that finds nothing is NOT an error; it is
//! a valid empty result handled by the caller.

use thiserror::Error;

use crate::types::FailureKind;

#[derive(Debug, Error)]
pub enum DocentError {
    /// Empty or malformed query text, rejected before any retrieval work.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The index snapshot was never built or failed to load.
    #[error("Knowledge base not built or loaded")]
    KnowledgeBaseUnavailable,

    /// The embedding backend is unreachable, timed out, or misconfigured.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// The completion service did not answer within the request timeout.
    #[error("Completion service timed out")]
    UpstreamTimeout,

    /// The completion service answered with a non-success status.
    #[error("Completion service error {status}: {body}")]
    UpstreamError { status: u16, body: String },

    /// The completion service could not be reached at all.
    #[error("Completion service unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The prompt template is missing a required placeholder.
    #[error("Prompt template error: {0}")]
    TemplateError(String),

    /// The assembled prompt exceeds the configured character budget.
    #[error("Assembled prompt too large: {len} chars (max {max})")]
    ContextTooLarge { len: usize, max: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocentError>;

impl DocentError {
    /// The failure kind to attach to a degraded answer, if this error is
    /// one the pipeline recovers from with a fallback response.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DocentError::KnowledgeBaseUnavailable => Some(FailureKind::KnowledgeBaseUnavailable),
            DocentError::ModelUnavailable(_) => Some(FailureKind::ModelUnavailable),
            DocentError::UpstreamTimeout => Some(FailureKind::UpstreamTimeout),
            DocentError::UpstreamError { .. } => Some(FailureKind::UpstreamError),
            DocentError::UpstreamUnreachable(_) => Some(FailureKind::UpstreamUnreachable),
            _ => None,
        }
    }
}
