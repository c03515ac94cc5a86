//! # Docent Knowledge Base
//!
//! Ingestion and retrieval over a fixed personal corpus.
//!
//! ## Design
//! - **Fixed-window chunking** — overlapping character windows with
//!   traceable source offsets
//! - **In-memory snapshot** — all chunk vectors frozen into one immutable
//!   structure, replaced wholesale on rebuild (atomic swap)
//! - **Cosine search** — brute-force over the snapshot; plenty for a
//!   personal corpus of a few thousand chunks
//! - **JSON persistence** — the whole snapshot written and reloaded as one
//!   file
//!
//! ## How it works
//! ```text
//! data/*.md
//!   ↓ load_documents
//! Chunker.split_all (size 800, overlap 80)
//!   ↓ embed_many
//! Snapshot { chunks + vectors }
//!   ↓ IndexStore.install (atomic swap)
//! search(query_vector, k) → top-K scored chunks
//! ```

pub mod chunker;
pub mod index;
pub mod loader;

pub use chunker::Chunker;
pub use index::{IndexStore, Snapshot};
pub use loader::load_documents;
