//! Backend traits — the seams where external model services plug in.
//!
//! Both traits are object-safe so the engine can hold `Box<dyn ...>` /
//! `Arc<dyn ...>` and tests can substitute deterministic stubs.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to a fixed-dimension dense vector.
///
/// Implementations must be deterministic for a fixed model version: the
/// same text always yields the same vector. A backend failure surfaces as
/// `ModelUnavailable`, never a silent zero vector.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Output vector dimension.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Batched variant; the output order matches the input order.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Generation parameters forwarded to the completion service.
#[derive(Debug, Clone)]
pub struct CompleteParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Sends a rendered prompt to an external completion service.
///
/// One attempt per call, bounded by the backend's request timeout; retry
/// policy, if any, belongs to the caller.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the backend has what it needs to serve requests (API key,
    /// endpoint). Surfaced on the health probe.
    fn is_configured(&self) -> bool;

    async fn complete(&self, prompt: &str, params: &CompleteParams) -> Result<String>;
}
