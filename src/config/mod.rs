//! Configuration module for Candlelight.
//!
//! Handles loading application settings, prompt templates and API credentials.

mod credentials;
mod prompts;
mod settings;

pub use credentials::{ApiCredentials, Credentials};
pub use prompts::{CondensePrompts, Prompts, QaPrompts};
pub use settings::{
    DatasetSettings, EmbeddingSettings, GeneralSettings, IndexSettings, LlmSettings,
    PromptSettings, RetrievalSettings, Settings, ThresholdPolicy, INDEX_FILE_NAME,
};
