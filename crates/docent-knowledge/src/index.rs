//! Index store — frozen chunk vectors with cosine-similarity search.
//!
//! A `Snapshot` is immutable once built. The `IndexStore` holds the current
//! snapshot behind an `RwLock<Option<Arc<..>>>`: searches clone the `Arc`
//! and release the lock immediately, so a rebuild swapping in a new
//! snapshot never disturbs queries already running against the old one.

use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docent_core::error::{DocentError, Result};
use docent_core::types::{Chunk, RetrievalResult, ScoredChunk};

/// A chunk with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// The complete, immutable state of the index at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub dimension: usize,
    pub built_at: DateTime<Utc>,
    pub chunks: Vec<IndexedChunk>,
}

impl Snapshot {
    /// Freeze chunks and their vectors into a searchable snapshot.
    ///
    /// `chunks` and `embeddings` must be parallel; every vector must have
    /// the declared dimension.
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>, dimension: usize) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(DocentError::InvalidInput(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        for (chunk, embedding) in chunks.iter().zip(&embeddings) {
            if embedding.len() != dimension {
                return Err(DocentError::InvalidInput(format!(
                    "chunk {} has embedding dimension {} (expected {dimension})",
                    chunk.id,
                    embedding.len()
                )));
            }
        }

        let indexed = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Ok(Self {
            dimension,
            built_at: Utc::now(),
            chunks: indexed,
        })
    }

    /// Rank all chunks against `query` by cosine similarity, best first.
    ///
    /// Returns at most `k` hits at or above `min_score`. Ties keep chunk
    /// insertion order (the sort is stable). A dimension mismatch returns
    /// no hits rather than garbage scores.
    pub fn search(&self, query: &[f32], k: usize, min_score: f32) -> RetrievalResult {
        if query.len() != self.dimension {
            tracing::debug!(
                "Query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            );
            return Vec::new();
        }

        let mut hits: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .map(|ic| ScoredChunk {
                chunk: ic.chunk.clone(),
                score: cosine(query, &ic.embedding),
            })
            .filter(|h| h.score >= min_score)
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        hits
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

/// Holder for the current snapshot; read-mostly, rebuilt wholesale.
pub struct IndexStore {
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl IndexStore {
    /// Create an empty store (no snapshot installed).
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
        }
    }

    /// Atomically replace the current snapshot. Queries holding the old
    /// `Arc` finish against it undisturbed.
    pub fn install(&self, snapshot: Snapshot) {
        let chunks = snapshot.len();
        *self.snapshot.write().unwrap() = Some(Arc::new(snapshot));
        tracing::info!("Index snapshot installed ({chunks} chunks)");
    }

    /// The current snapshot, if one has been built or loaded.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().unwrap().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().unwrap().is_some()
    }

    pub fn chunk_count(&self) -> usize {
        self.current().map(|s| s.len()).unwrap_or(0)
    }

    /// Search the current snapshot. An empty or unbuilt store yields an
    /// empty result, never an error; callers handle "no results"
    /// explicitly.
    pub fn search(&self, query: &[f32], k: usize, min_score: f32) -> RetrievalResult {
        match self.current() {
            Some(snapshot) => snapshot.search(query, k, min_score),
            None => Vec::new(),
        }
    }

    /// Persist the current snapshot as one JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let snapshot = self.current().ok_or(DocentError::KnowledgeBaseUnavailable)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(snapshot.as_ref())?;
        std::fs::write(path, json)?;
        tracing::info!("Index snapshot saved to {}", path.display());
        Ok(())
    }

    /// Load and install a previously saved snapshot. Returns the chunk
    /// count.
    pub fn load(&self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        let chunks = snapshot.len();
        self.install(snapshot);
        Ok(chunks)
    }
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}
