//! # Docent Engine
//! The question-answering pipeline — retrieval, prompt assembly, and
//! answer generation behind one injectable service object.
//!
//! ## Request flow
//! - **Validate**: empty query text is rejected before any external call
//! - **Retrieve**: embed the query, rank chunks by cosine similarity
//! - **Assemble**: join the top chunks and render the prompt template
//! - **Generate**: one bounded completion call; upstream failures degrade
//!   to a fallback answer with the failure kind attached
//!
//! Rebuilds are full-replace: chunk → embed → freeze a new snapshot, then
//! swap it in atomically. At most one rebuild runs at a time; queries keep
//! searching the old snapshot until the swap.

pub mod generator;
pub mod prompt;
pub mod retriever;

use std::sync::Arc;

use serde::Serialize;

use docent_core::config::{DocentConfig, expand_path};
use docent_core::error::{DocentError, Result};
use docent_core::traits::{CompletionBackend, EmbeddingBackend};
use docent_core::types::{Answer, Document, FailureKind, RetrievalResult, Status};
use docent_knowledge::{Chunker, IndexStore, Snapshot, load_documents};

use crate::generator::AnswerGenerator;
use crate::prompt::PromptTemplate;
use crate::retriever::Retriever;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub documents: usize,
    pub chunks: usize,
}

/// The Docent assistant — answers queries against the knowledge base.
///
/// Explicitly constructed with its dependencies (no process-wide state),
/// so tests run it against stub backends. Shared behind `Arc`; queries
/// need only `&self`.
pub struct Assistant {
    config: DocentConfig,
    embedder: Arc<dyn EmbeddingBackend>,
    store: Arc<IndexStore>,
    retriever: Retriever,
    template: PromptTemplate,
    generator: AnswerGenerator,
    /// At most one rebuild in flight.
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("embedder", &self.embedder.name())
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Create an assistant with backends resolved from configuration.
    pub fn new(config: DocentConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingBackend> =
            Arc::from(docent_providers::create_embedding_backend(&config)?);
        let completion = docent_providers::create_completion_backend(&config)?;
        Self::with_backends(config, embedder, completion)
    }

    /// Create an assistant with explicit backends (dependency injection
    /// for tests and embedding-in-other-hosts).
    pub fn with_backends(
        config: DocentConfig,
        embedder: Arc<dyn EmbeddingBackend>,
        completion: Box<dyn CompletionBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(IndexStore::new());
        let retriever = Retriever::new(
            embedder.clone(),
            store.clone(),
            config.knowledge.min_score,
        );
        let template = if config.llm.prompt_template.is_empty() {
            PromptTemplate::for_identity(&config.identity, config.llm.max_prompt_chars)
        } else {
            PromptTemplate::new(config.llm.prompt_template.clone(), config.llm.max_prompt_chars)?
        };
        let generator = AnswerGenerator::new(completion, &config.llm, config.identity.clone());

        Ok(Self {
            config,
            embedder,
            store,
            retriever,
            template,
            generator,
            rebuild_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Answer one query end to end.
    ///
    /// Degraded outcomes (knowledge base unavailable, upstream failures)
    /// come back as `Ok` answers carrying a `failure` kind; only invalid
    /// input and request-fatal misconfiguration (template, context budget)
    /// are `Err`.
    pub async fn answer_query(&self, query_text: &str) -> Result<Answer> {
        let query = query_text.trim();
        if query.is_empty() {
            return Err(DocentError::InvalidInput("empty query text".into()));
        }
        tracing::info!("Processing query ({} chars)", query.len());

        let results = match self
            .retriever
            .retrieve(query, self.config.knowledge.top_k)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                let Some(kind) = e.failure_kind() else {
                    return Err(e);
                };
                tracing::warn!("Retrieval failed: {e}");
                let text = match kind {
                    FailureKind::KnowledgeBaseUnavailable => self.generator.kb_unavailable_text(),
                    _ => self.generator.trouble_text(),
                };
                return Ok(Answer::degraded(text, kind));
            }
        };

        if results.is_empty() {
            tracing::debug!("No matching chunks; answering with don't-know fallback");
            return Ok(Answer::ok(self.generator.no_results_text(), vec![]));
        }

        let prompt = self.template.render(query, &results)?;
        let (text, failure) = self.generator.generate(&prompt).await;

        if failure.is_some() {
            return Ok(Answer {
                text,
                sources: vec![],
                failure,
            });
        }
        Ok(Answer::ok(text, ranked_sources(&results)))
    }

    /// Rebuild the index from the given documents: chunk, embed, freeze,
    /// swap. On any failure the previous snapshot stays untouched.
    pub async fn rebuild_index(&self, documents: &[Document]) -> Result<RebuildReport> {
        let _guard = self.rebuild_lock.lock().await;

        let chunker = Chunker::from_config(&self.config.knowledge)?;
        let chunks = chunker.split_all(documents);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_many(&texts).await?;
        let snapshot = Snapshot::build(chunks, embeddings, self.embedder.dimension())?;

        let report = RebuildReport {
            documents: documents.len(),
            chunks: snapshot.len(),
        };
        self.store.install(snapshot);
        tracing::info!(
            "Index rebuilt: {} document(s), {} chunk(s)",
            report.documents,
            report.chunks
        );
        Ok(report)
    }

    /// Rebuild from the configured data directory and persist the result.
    pub async fn rebuild_from_data_dir(&self) -> Result<RebuildReport> {
        let dir = expand_path(&self.config.knowledge.data_dir);
        let documents = load_documents(&dir)?;
        if documents.is_empty() {
            return Err(DocentError::Config(format!(
                "no documents found in {}",
                dir.display()
            )));
        }
        let report = self.rebuild_index(&documents).await?;
        self.save_snapshot()?;
        Ok(report)
    }

    /// Retrieve without generating; used by the search surface.
    pub async fn retrieve(&self, query_text: &str, k: usize) -> Result<RetrievalResult> {
        self.retriever.retrieve(query_text, k).await
    }

    /// Persist the current snapshot to the configured path.
    pub fn save_snapshot(&self) -> Result<()> {
        let path = expand_path(&self.config.knowledge.snapshot_path);
        self.store.save(&path)
    }

    /// Load a previously persisted snapshot, if one exists. Returns
    /// whether an index is now available.
    pub fn load_snapshot(&self) -> Result<bool> {
        let path = expand_path(&self.config.knowledge.snapshot_path);
        if !path.exists() {
            tracing::warn!("No index snapshot at {}; run ingest first", path.display());
            return Ok(false);
        }
        let chunks = self.store.load(&path)?;
        tracing::info!("Index snapshot loaded ({chunks} chunks)");
        Ok(true)
    }

    /// Operational status for the health probe.
    pub fn status(&self) -> Status {
        Status {
            index_loaded: self.store.is_loaded(),
            llm_configured: self.generator.is_configured(),
            chunks: self.store.chunk_count(),
        }
    }

    pub fn config(&self) -> &DocentConfig {
        &self.config
    }
}

/// Distinct source documents of the hits, in rank order, capped at three.
fn ranked_sources(results: &[docent_core::types::ScoredChunk]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for hit in results {
        if !sources.contains(&hit.chunk.doc_id) {
            sources.push(hit.chunk.doc_id.clone());
        }
    }
    sources.truncate(3);
    sources
}
