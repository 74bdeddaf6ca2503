//! Error types for Candlelight.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for Candlelight operations.
#[derive(Error, Debug)]
pub enum CandlelightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set. Export it or add it to a .env file.")]
    MissingCredential(String),

    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Knowledge base not built yet: {} does not exist. Run 'candlelight build' first.", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Knowledge base does not match configuration: {0}. Rebuild it with 'candlelight build'.")]
    IndexMismatch(String),

    #[error("Prompt template error: {0}")]
    Prompt(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Candlelight operations.
pub type Result<T> = std::result::Result<T, CandlelightError>;
