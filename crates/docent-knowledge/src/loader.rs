//! Document source — reads the static corpus from a directory.

use std::path::Path;

use docent_core::error::{DocentError, Result};
use docent_core::types::Document;

/// Load every `*.md` file under `dir` as a document.
///
/// Document ids are file names (not full paths). Files are returned in
/// name order so ingestion runs are reproducible. Empty files are skipped.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(DocentError::Config(format!(
            "data directory {} not found",
            dir.display()
        )));
    }

    let mut docs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let text = std::fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            tracing::warn!("Skipping empty document {}", path.display());
            continue;
        }
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        docs.push(Document::new(id, text));
    }

    docs.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::info!("Loaded {} document(s) from {}", docs.len(), dir.display());
    Ok(docs)
}
