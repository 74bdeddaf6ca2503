//! Configuration settings for Candlelight.

use crate::dataset::DatasetFormat;
use crate::error::{CandlelightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the SQLite index inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.db";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub dataset: DatasetSettings,
    pub index: IndexSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub retrieval: RetrievalSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level used when neither `-v` nor `RUST_LOG` is given.
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.candlelight".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// FAQ dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Path to the FAQ dataset.
    pub path: String,
    /// Column whose value identifies each document.
    pub source_column: String,
    /// Dataset format. Inferred from the file extension when unset.
    pub format: Option<DatasetFormat>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: "candlelight_faq.csv".to_string(),
            source_column: "prompt".to_string(),
            format: None,
        }
    }
}

/// Knowledge-base index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Directory holding the persisted index.
    pub dir: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            dir: "~/.candlelight/faq_index".to_string(),
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Requested embedding dimensions. The model's native size when unset.
    pub dimensions: Option<u32>,
    /// Base URL of an OpenAI-compatible API. The OpenAI API when unset.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum number of texts per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 100,
        }
    }
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used for condensing and answering.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Base URL of an OpenAI-compatible API. The OpenAI API when unset.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Timeout for a single API request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// How the similarity threshold is applied during retrieval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Exclude documents scoring below the threshold, then keep the best `top_k`.
    #[default]
    Cutoff,
    /// Plain top-k similarity search; the threshold is ignored.
    TopK,
}

impl std::str::FromStr for ThresholdPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cutoff" | "threshold" => Ok(ThresholdPolicy::Cutoff),
            "top_k" | "topk" | "top-k" => Ok(ThresholdPolicy::TopK),
            _ => Err(format!("Unknown threshold policy: {}", s)),
        }
    }
}

impl std::fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdPolicy::Cutoff => write!(f, "cutoff"),
            ThresholdPolicy::TopK => write!(f, "top_k"),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Maximum number of documents handed to the model.
    pub top_k: usize,
    /// Minimum cosine similarity for a document to count as relevant.
    pub score_threshold: f32,
    /// How the threshold is applied.
    pub policy: ThresholdPolicy,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: 0.7,
            policy: ThresholdPolicy::Cutoff,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory with `condense.toml` and/or `qa.toml` overriding the defaults.
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CandlelightError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would only fail later, deep inside a build or query.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.source_column.trim().is_empty() {
            return Err(CandlelightError::Config(
                "dataset.source_column must not be empty".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(CandlelightError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.retrieval.score_threshold) {
            return Err(CandlelightError::Config(format!(
                "retrieval.score_threshold must be within [-1, 1], got {}",
                self.retrieval.score_threshold
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(CandlelightError::Config(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        for (key, base) in [
            ("embedding.api_base", &self.embedding.api_base),
            ("llm.api_base", &self.llm.api_base),
        ] {
            if let Some(base) = base {
                url::Url::parse(base).map_err(|e| {
                    CandlelightError::Config(format!("{} is not a valid URL ({}): {}", key, base, e))
                })?;
            }
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("candlelight")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded dataset path.
    pub fn dataset_path(&self) -> PathBuf {
        Self::expand_path(&self.dataset.path)
    }

    /// Get the expanded index directory.
    pub fn index_dir(&self) -> PathBuf {
        Self::expand_path(&self.index.dir)
    }

    /// Get the path of the persisted index file.
    pub fn index_path(&self) -> PathBuf {
        self.index_dir().join(INDEX_FILE_NAME)
    }
}
