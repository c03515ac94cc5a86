//! Retriever — embeds the query and searches the index snapshot.

use std::sync::Arc;

use docent_core::error::{DocentError, Result};
use docent_core::traits::EmbeddingBackend;
use docent_core::types::RetrievalResult;
use docent_knowledge::IndexStore;

pub struct Retriever {
    embedder: Arc<dyn EmbeddingBackend>,
    store: Arc<IndexStore>,
    min_score: f32,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingBackend>, store: Arc<IndexStore>, min_score: f32) -> Self {
        Self {
            embedder,
            store,
            min_score,
        }
    }

    /// Top-`k` chunks for `query_text`, best first.
    ///
    /// A store with no snapshot is `KnowledgeBaseUnavailable`; a snapshot
    /// that simply matches nothing is a valid empty result. Embedding
    /// failures (`ModelUnavailable`) propagate.
    pub async fn retrieve(&self, query_text: &str, k: usize) -> Result<RetrievalResult> {
        if !self.store.is_loaded() {
            return Err(DocentError::KnowledgeBaseUnavailable);
        }
        let query_vector = self.embedder.embed(query_text).await?;
        Ok(self.store.search(&query_vector, k, self.min_score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::types::Document;
    use docent_knowledge::{Chunker, Snapshot};
    use docent_providers::HashEmbeddingBackend;

    async fn build_store(embedder: &HashEmbeddingBackend, docs: &[Document]) -> Arc<IndexStore> {
        let chunker = Chunker::new(60, 10).unwrap();
        let chunks = chunker.split_all(docs);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_many(&texts).await.unwrap();
        let store = Arc::new(IndexStore::new());
        store.install(Snapshot::build(chunks, embeddings, embedder.dimension()).unwrap());
        store
    }

    #[tokio::test]
    async fn test_unbuilt_store_is_unavailable() {
        let embedder = Arc::new(HashEmbeddingBackend::new(32));
        let retriever = Retriever::new(embedder, Arc::new(IndexStore::new()), 0.0);
        let err = retriever.retrieve("anything", 3).await.unwrap_err();
        assert!(matches!(err, DocentError::KnowledgeBaseUnavailable));
    }

    #[tokio::test]
    async fn test_verbatim_chunk_text_ranks_first() {
        let embedder = HashEmbeddingBackend::new(64);
        let docs = vec![
            Document::new(
                "career.md",
                "Works as a software engineer automating deployment pipelines and cloud infrastructure for a laboratory group.",
            ),
            Document::new(
                "hobbies.md",
                "Enjoys playing guitar and flute, singing, and following space exploration programs closely.",
            ),
        ];
        let store = build_store(&embedder, &docs).await;
        let embedder = Arc::new(embedder);
        let retriever = Retriever::new(embedder, store.clone(), 0.0);

        // Query with the exact text of one chunk: self-similarity is maximal.
        let target = store.current().unwrap().chunks[0].chunk.clone();
        let hits = retriever.retrieve(&target.text, 3).await.unwrap();
        assert_eq!(hits[0].chunk.id, target.id);
        assert!(hits[0].score > 0.999);
    }

    #[tokio::test]
    async fn test_k_caps_results() {
        let embedder = HashEmbeddingBackend::new(64);
        let docs = vec![Document::new(
            "notes.md",
            "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen",
        )];
        let store = build_store(&embedder, &docs).await;
        let retriever = Retriever::new(Arc::new(embedder), store.clone(), 0.0);

        let total = store.chunk_count();
        assert!(total > 1);
        let hits = retriever.retrieve("three four", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = retriever.retrieve("three four", total + 10).await.unwrap();
        assert_eq!(hits.len(), total);
    }
}
