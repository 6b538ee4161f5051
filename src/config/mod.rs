//! Configuration management for siteintel
//!
//! Handles loading and validating configuration from TOML files. All
//! thresholds for quality scoring, chunking, retrieval, and model retries
//! live here so they can be tuned without touching pipeline code.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Content resolution (primary fetch + fallback reader)
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Quality scoring thresholds
    #[serde(default)]
    pub quality: QualityConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunk: ChunkConfig,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generative model configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Chat retrieval and history configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Content resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Request timeout in seconds for the primary fetch
    #[serde(default = "default_resolver_timeout")]
    pub timeout_secs: u64,

    /// User agent string sent with primary fetches
    #[serde(default = "default_resolver_user_agent")]
    pub user_agent: String,

    /// Base URL of the fallback reader service (None disables the fallback)
    #[serde(default)]
    pub fallback_url: Option<String>,

    /// Environment variable holding the fallback reader API key
    #[serde(default = "default_fallback_api_key_env")]
    pub fallback_api_key_env: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_resolver_timeout(),
            user_agent: default_resolver_user_agent(),
            fallback_url: None,
            fallback_api_key_env: default_fallback_api_key_env(),
        }
    }
}

/// Quality scoring thresholds
///
/// A page is usable only if it clears all three thresholds at once; failing
/// any one rejects the page and triggers the fallback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum cleaned text length in characters
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Minimum ratio of cleaned text length to raw HTML length
    #[serde(default = "default_min_text_ratio")]
    pub min_text_ratio: f64,

    /// Minimum number of business keyword matches in the cleaned text
    #[serde(default = "default_min_keyword_matches")]
    pub min_keyword_matches: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            min_text_ratio: default_min_text_ratio(),
            min_keyword_matches: default_min_keyword_matches(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum characters per chunk
    #[serde(default = "default_chunk_max_chars")]
    pub max_chars: usize,

    /// Overlap characters between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub overlap_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: default_chunk_max_chars(),
            overlap_chars: default_chunk_overlap(),
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Maximum concurrent chunk-embedding calls during indexing
    #[serde(default = "default_embedding_concurrency")]
    pub concurrency: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            concurrency: default_embedding_concurrency(),
        }
    }
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name/identifier
    #[serde(default = "default_model_name")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_model_api_base")]
    pub api_base: String,

    /// Environment variable holding the model API key
    #[serde(default = "default_model_api_key_env")]
    pub api_key_env: String,

    /// Maximum retries for transient upstream errors
    #[serde(default = "default_model_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds (doubles per retry)
    #[serde(default = "default_model_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum content characters included in an extraction prompt
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model_name(),
            api_base: default_model_api_base(),
            api_key_env: default_model_api_key_env(),
            max_retries: default_model_max_retries(),
            initial_backoff_ms: default_model_backoff_ms(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

/// Chat retrieval and history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of top-scoring chunks used as answer sources
    #[serde(default = "default_chat_top_k")]
    pub top_k: usize,

    /// Minimum similarity score for a chunk to qualify as a source
    #[serde(default = "default_chat_min_score")]
    pub min_score: f32,

    /// Maximum prior turns included in a chat prompt (older turns are
    /// dropped; this is the documented truncation limit)
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: default_chat_top_k(),
            min_score: default_chat_min_score(),
            max_history_turns: default_max_history_turns(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Validate threshold sanity
    pub fn validate(&self) -> Result<()> {
        if self.chunk.overlap_chars >= self.chunk.max_chars {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk.overlap_chars, self.chunk.max_chars
            )));
        }
        if !(0.0..=1.0).contains(&self.quality.min_text_ratio) {
            return Err(Error::Config(format!(
                "min_text_ratio must be in 0..=1, got {}",
                self.quality.min_text_ratio
            )));
        }
        if self.chat.top_k == 0 {
            return Err(Error::Config("chat top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}
