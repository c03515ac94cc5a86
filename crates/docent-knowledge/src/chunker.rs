//! Fixed-window document chunker.
//!
//! Scans left to right emitting windows of `chunk_size` characters,
//! advancing by `chunk_size - overlap` each step. The final window may be
//! shorter; a document shorter than one window yields exactly one chunk.
//! Windows are measured in characters, never bytes, so multi-byte text
//! cannot be split mid-codepoint.

use docent_core::config::KnowledgeConfig;
use docent_core::error::{DocentError, Result};
use docent_core::types::{Chunk, Document};

pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker. Requires `chunk_size > overlap >= 0` and
    /// `chunk_size > 0`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocentError::InvalidInput("chunk_size must be > 0".into()));
        }
        if overlap >= chunk_size {
            return Err(DocentError::InvalidInput(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(config: &KnowledgeConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split one document, assigning chunk ids starting at `first_id`.
    ///
    /// `Chunk::start` is the character offset of the window within the
    /// document.
    pub fn split(&self, doc: &Document, first_id: u32) -> Vec<Chunk> {
        // Byte offset of every char position, plus an end sentinel, so char
        // windows can slice the original text directly.
        let offsets: Vec<usize> = doc
            .text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(doc.text.len()))
            .collect();
        let len = offsets.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + self.chunk_size).min(len);
            chunks.push(Chunk {
                id: first_id + chunks.len() as u32,
                doc_id: doc.id.clone(),
                start,
                text: doc.text[offsets[start]..offsets[end]].to_string(),
            });
            if end == len {
                break;
            }
            start += step;
        }
        chunks
    }

    /// Split a batch of documents with ids monotonically assigned across
    /// the whole run.
    pub fn split_all(&self, docs: &[Document]) -> Vec<Chunk> {
        let mut all: Vec<Chunk> = Vec::new();
        for doc in docs {
            let chunks = self.split(doc, all.len() as u32);
            all.extend(chunks);
        }
        tracing::debug!("Split {} document(s) into {} chunk(s)", docs.len(), all.len());
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("test.md", text)
    }

    /// count = max(1, ceil((L - o) / (s - o)))
    fn expected_count(len: usize, size: usize, overlap: usize) -> usize {
        let step = size - overlap;
        len.saturating_sub(overlap).div_ceil(step).max(1)
    }

    #[test]
    fn test_short_document_single_chunk() {
        let chunker = Chunker::new(800, 80).unwrap();
        let d = doc("short text");
        let chunks = chunker.split(&d, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].doc_id, "test.md");
    }

    #[test]
    fn test_chunk_count_law() {
        for (len, size, overlap) in [
            (10usize, 4usize, 1usize),
            (9, 4, 1),
            (12, 4, 1),
            (100, 10, 3),
            (5, 5, 2),
            (2523, 800, 80),
            (0, 4, 1),
        ] {
            let text: String = std::iter::repeat('x').take(len).collect();
            let chunker = Chunker::new(size, overlap).unwrap();
            let chunks = chunker.split(&doc(&text), 0);
            assert_eq!(
                chunks.len(),
                expected_count(len, size, overlap),
                "count mismatch for len={len} size={size} overlap={overlap}"
            );
            for c in &chunks {
                assert!(c.text.chars().count() <= size);
            }
        }
    }

    #[test]
    fn test_offsets_and_overlap() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunker = Chunker::new(30, 10).unwrap();
        let chunks = chunker.split(&doc(&text), 0);

        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.start, i * 20);
            assert_eq!(c.id, i as u32);
        }
        // Adjacent chunks share exactly `overlap` characters.
        for w in chunks.windows(2) {
            let prev_tail: String = w[0].text.chars().skip(w[0].text.chars().count() - 10).collect();
            let next_head: String = w[1].text.chars().take(10).collect();
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn test_reconstruction() {
        let text = "The quick brown fox jumps over the lazy dog, again and again, until the end of the corpus.";
        let chunker = Chunker::new(24, 6).unwrap();
        let chunks = chunker.split(&doc(text), 0);
        assert!(chunks.len() > 1);

        let mut rebuilt: String = chunks[0].text.clone();
        for c in &chunks[1..] {
            rebuilt.extend(c.text.chars().skip(6));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "héllo wörld — ünïcode çhünks repeated: ".repeat(8);
        let chunker = Chunker::new(25, 5).unwrap();
        let chunks = chunker.split(&doc(&text), 0);
        for c in &chunks {
            assert!(c.text.chars().count() <= 25);
        }
        let mut rebuilt: String = chunks[0].text.clone();
        for c in &chunks[1..] {
            rebuilt.extend(c.text.chars().skip(5));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_ids_monotonic_across_documents() {
        let chunker = Chunker::new(10, 2).unwrap();
        let docs = vec![
            Document::new("a.md", "aaaaaaaaaaaaaaaaaaaa"),
            Document::new("b.md", "bbbbbbbbbbbbbbbbbbbb"),
        ];
        let chunks = chunker.split_all(&docs);
        let ids: Vec<u32> = chunks.iter().map(|c| c.id).collect();
        let expected: Vec<u32> = (0..chunks.len() as u32).collect();
        assert_eq!(ids, expected);
        assert!(chunks.iter().any(|c| c.doc_id == "b.md"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(10, 10).is_err());
        assert!(Chunker::new(10, 15).is_err());
        assert!(Chunker::new(10, 9).is_ok());
    }
}
