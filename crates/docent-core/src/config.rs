//! Docent configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocentError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocentConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for DocentConfig {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            knowledge: KnowledgeConfig::default(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl DocentConfig {
    /// Load config from the default path (~/.docent/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocentError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DocentError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocentError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let k = &self.knowledge;
        if k.chunk_size == 0 {
            return Err(DocentError::Config("chunk_size must be > 0".into()));
        }
        if k.chunk_overlap >= k.chunk_size {
            return Err(DocentError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                k.chunk_overlap, k.chunk_size
            )));
        }
        if k.top_k == 0 {
            return Err(DocentError::Config("top_k must be > 0".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(DocentError::Config("embedding dimension must be > 0".into()));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Docent home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docent")
    }
}

/// Tilde-expand a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

/// Who the knowledge base is about, woven into prompts and fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Name of the person (or subject) the documents describe.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Name the assistant introduces itself with.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    /// Contact line offered in fallback answers (email, URL); may be empty.
    #[serde(default)]
    pub contact: String,
}

fn default_owner() -> String { "the author".into() }
fn default_assistant_name() -> String { "Docent".into() }

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            assistant_name: default_assistant_name(),
            contact: String::new(),
        }
    }
}

/// Knowledge base ingestion and retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory of source documents (*.md).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Where the built index snapshot is persisted.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// How many chunks a query retrieves.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum cosine similarity a hit must reach; 0.0 disables the cutoff.
    #[serde(default)]
    pub min_score: f32,
}

fn default_data_dir() -> String { "~/.docent/data".into() }
fn default_snapshot_path() -> String { "~/.docent/index.json".into() }
fn default_chunk_size() -> usize { 800 }
fn default_chunk_overlap() -> usize { 80 }
fn default_top_k() -> usize { 5 }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_path: default_snapshot_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            min_score: 0.0,
        }
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "hash" (deterministic, offline) or "openai" (HTTP, OpenAI-compatible).
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Base URL for the HTTP provider (e.g., "https://api.openai.com/v1").
    #[serde(default)]
    pub endpoint: String,
    /// API key; falls back to the DOCENT_EMBEDDING_API_KEY env var.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String { "hash".into() }
fn default_embedding_model() -> String { "all-MiniLM-L6-v2".into() }
fn default_embedding_dimension() -> usize { 384 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            endpoint: String::new(),
            api_key: String::new(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Completion (LLM) backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// API key; falls back to the DOCENT_API_KEY env var.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Hard budget for the rendered prompt, in characters.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
    /// Custom prompt template with `{context}` and `{question}`
    /// placeholders; empty uses the built-in one.
    #[serde(default)]
    pub prompt_template: String,
}

fn default_llm_endpoint() -> String { "https://api.groq.com/openai/v1".into() }
fn default_llm_model() -> String { "llama3-8b-8192".into() }
fn default_max_tokens() -> u32 { 512 }
fn default_temperature() -> f32 { 0.3 }
fn default_max_prompt_chars() -> usize { 24000 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_prompt_chars: default_max_prompt_chars(),
            prompt_template: String::new(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DocentConfig::default();
        assert_eq!(config.knowledge.chunk_size, 800);
        assert_eq!(config.knowledge.chunk_overlap, 80);
        assert_eq!(config.knowledge.top_k, 5);
        assert_eq!(config.embedding.dimension, 384);
        assert_eq!(config.llm.max_tokens, 512);
        assert!((config.llm.temperature - 0.3).abs() < 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [identity]
            owner = "Ada Lovelace"
            contact = "ada@example.com"

            [knowledge]
            chunk_size = 400
            chunk_overlap = 40
            top_k = 3

            [llm]
            model = "llama3-70b-8192"
        "#;

        let config: DocentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.identity.owner, "Ada Lovelace");
        assert_eq!(config.knowledge.chunk_size, 400);
        assert_eq!(config.knowledge.top_k, 3);
        assert_eq!(config.llm.model, "llama3-70b-8192");
        // Untouched sections keep their defaults
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.embedding.provider, "hash");
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let toml_str = "";
        let config: DocentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.identity.assistant_name, "Docent");
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn test_validate_rejects_bad_chunk_params() {
        let mut config = DocentConfig::default();
        config.knowledge.chunk_overlap = 800;
        assert!(config.validate().is_err());

        let mut config = DocentConfig::default();
        config.knowledge.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_home_dir() {
        let home = DocentConfig::home_dir();
        assert!(home.to_string_lossy().contains("docent"));
    }
}
