//! Embedding backends.
//!
//! `HttpEmbeddingBackend` calls an OpenAI-compatible `/embeddings`
//! endpoint. `HashEmbeddingBackend` is a deterministic token-hash
//! projection with no model and no network, used as the offline default
//! and as the reproducible stub in tests: re-embedding identical text
//! always yields a bit-identical vector.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use twox_hash::XxHash64;

use docent_core::config::EmbeddingConfig;
use docent_core::error::{DocentError, Result};
use docent_core::traits::EmbeddingBackend;

/// OpenAI-compatible embeddings client.
pub struct HttpEmbeddingBackend {
    api_key: String,
    base_url: String,
    model: String,
    dimension: usize,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpEmbeddingBackend {
    /// Create from config. API key resolution: `embedding.api_key` >
    /// `DOCENT_EMBEDDING_API_KEY` env var > empty.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(DocentError::Config(
                "embedding.endpoint is required for the openai embedding provider".into(),
            ));
        }
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("DOCENT_EMBEDDING_API_KEY").unwrap_or_default()
        };
        Ok(Self {
            api_key,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbeddingBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_many(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DocentError::ModelUnavailable("empty embedding response".into()))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        tracing::debug!("Embedding batch of {} text(s) via {}", texts.len(), self.model);

        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let mut req = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                DocentError::ModelUnavailable(format!("embedding request timed out ({url})"))
            } else {
                DocentError::ModelUnavailable(format!("embedding backend unreachable ({url}): {e}"))
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DocentError::ModelUnavailable(format!(
                "embedding API error {status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| DocentError::ModelUnavailable(format!("invalid embedding response: {e}")))?;

        parse_embeddings(&payload, texts.len(), self.dimension)
    }
}

/// Extract vectors from an OpenAI embeddings payload, restoring input
/// order via each item's `index` field.
fn parse_embeddings(payload: &Value, expected: usize, dimension: usize) -> Result<Vec<Vec<f32>>> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| DocentError::ModelUnavailable("embedding response missing data".into()))?;

    let mut vectors: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in data {
        let index = item["index"].as_u64().unwrap_or(u64::MAX) as usize;
        let embedding: Vec<f32> = item["embedding"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_f64()).map(|v| v as f32).collect())
            .unwrap_or_default();
        if index >= expected || embedding.len() != dimension {
            return Err(DocentError::ModelUnavailable(format!(
                "malformed embedding at index {index} (dimension {})",
                embedding.len()
            )));
        }
        vectors[index] = Some(embedding);
    }

    vectors
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            DocentError::ModelUnavailable(format!(
                "embedding response returned fewer than {expected} vectors"
            ))
        })
}

/// Deterministic hash embedder.
///
/// Each token is hashed into a bucket and contributes a value derived from
/// the hash plus a small positional nudge; the result is L2-normalized.
/// Identical text therefore embeds to an identical unit vector, and a
/// chunk queried with its own text is its own best match.
pub struct HashEmbeddingBackend {
    dimension: usize,
}

impl HashEmbeddingBackend {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        let lowered = text.to_lowercase();
        for (i, token) in lowered.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            let val = ((h >> 32) as u32) as f32 / (u32::MAX as f32);
            v[idx] += val + (i % 3) as f32 * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl EmbeddingBackend for HashEmbeddingBackend {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let backend = HashEmbeddingBackend::new(64);
        let a = backend.embed("the quick brown fox").await.unwrap();
        let b = backend.embed("the quick brown fox").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedder_distinguishes_texts() {
        let backend = HashEmbeddingBackend::new(64);
        let a = backend.embed("blockchain smart contracts").await.unwrap();
        let b = backend.embed("guitar and flute music").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedder_normalizes() {
        let backend = HashEmbeddingBackend::new(32);
        let v = backend.embed("some words to embed here").await.unwrap();
        assert_eq!(v.len(), 32);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_embed_many_preserves_order() {
        let backend = HashEmbeddingBackend::new(16);
        let texts = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        let batch = backend.embed_many(&texts).await.unwrap();
        assert_eq!(batch.len(), 3);
        for (text, vector) in texts.iter().zip(&batch) {
            assert_eq!(&backend.embed(text).await.unwrap(), vector);
        }
    }

    #[test]
    fn test_parse_embeddings_restores_index_order() {
        let payload = json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]},
            ]
        });
        let vectors = parse_embeddings(&payload, 2, 2).unwrap();
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[test]
    fn test_parse_embeddings_rejects_malformed() {
        assert!(parse_embeddings(&json!({}), 1, 2).is_err());
        // Wrong dimension
        let payload = json!({"data": [{"index": 0, "embedding": [1.0]}]});
        assert!(parse_embeddings(&payload, 1, 2).is_err());
        // Missing vector
        let payload = json!({"data": []});
        assert!(parse_embeddings(&payload, 1, 2).is_err());
    }
}
