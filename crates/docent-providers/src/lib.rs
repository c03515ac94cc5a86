//! # Docent Providers
//!
//! External-model clients for Docent.
//!
//! The completion side speaks the OpenAI `chat/completions` format, which
//! covers Groq, OpenAI, Ollama, and every other compatible server; they
//! differ only in endpoint URL and API key. The embedding side has two
//! backends: the OpenAI `embeddings` format over HTTP, and a deterministic
//! hash embedder that needs no network at all (the default, and the stub
//! the test suite runs against).

pub mod completion;
pub mod embedding;

use docent_core::config::DocentConfig;
use docent_core::error::{DocentError, Result};
use docent_core::traits::{CompletionBackend, EmbeddingBackend};

pub use completion::HttpCompletionBackend;
pub use embedding::{HashEmbeddingBackend, HttpEmbeddingBackend};

/// Create the embedding backend named by `embedding.provider`.
pub fn create_embedding_backend(config: &DocentConfig) -> Result<Box<dyn EmbeddingBackend>> {
    match config.embedding.provider.as_str() {
        "hash" => Ok(Box::new(HashEmbeddingBackend::new(
            config.embedding.dimension,
        ))),
        "openai" => Ok(Box::new(HttpEmbeddingBackend::new(&config.embedding)?)),
        other => Err(DocentError::Config(format!(
            "unknown embedding provider '{other}' (expected \"hash\" or \"openai\")"
        ))),
    }
}

/// Create the completion backend from the `[llm]` section.
pub fn create_completion_backend(config: &DocentConfig) -> Result<Box<dyn CompletionBackend>> {
    Ok(Box::new(HttpCompletionBackend::new(&config.llm)))
}
