//! Domain types shared across the Docent pipeline.

use serde::{Deserialize, Serialize};

/// A named unit of source text, immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier — the source file name.
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A contiguous window of a document, the unit of retrieval.
///
/// `id` is monotonically assigned across one ingestion run. `start` is the
/// character offset within the source document, kept so a chunk can be
/// traced back even though overlapping windows duplicate text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: u32,
    pub doc_id: String,
    pub start: usize,
    pub text: String,
}

/// One retrieval hit: a chunk plus its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Ranked retrieval output, best match first, at most K entries.
pub type RetrievalResult = Vec<ScoredChunk>;

/// Which dependency failed when an answer is degraded to a fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    KnowledgeBaseUnavailable,
    ModelUnavailable,
    UpstreamTimeout,
    UpstreamError,
    UpstreamUnreachable,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::KnowledgeBaseUnavailable => "knowledge_base_unavailable",
            FailureKind::ModelUnavailable => "model_unavailable",
            FailureKind::UpstreamTimeout => "upstream_timeout",
            FailureKind::UpstreamError => "upstream_error",
            FailureKind::UpstreamUnreachable => "upstream_unreachable",
        }
    }
}

/// The end-to-end result of answering one query.
///
/// `sources` lists the distinct source documents of the retrieved chunks in
/// rank order. `failure` is set when the answer text is a fallback rather
/// than a model completion, so the caller can log or map it to a status.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
    pub failure: Option<FailureKind>,
}

impl Answer {
    pub fn ok(text: String, sources: Vec<String>) -> Self {
        Self {
            text,
            sources,
            failure: None,
        }
    }

    pub fn degraded(text: String, failure: FailureKind) -> Self {
        Self {
            text,
            sources: vec![],
            failure: Some(failure),
        }
    }
}

/// Operational status for the health probe.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    /// Whether an index snapshot is built and searchable.
    pub index_loaded: bool,
    /// Whether the completion backend has credentials/endpoint configured.
    pub llm_configured: bool,
    /// Number of chunks in the current snapshot (0 when unloaded).
    pub chunks: usize,
}
