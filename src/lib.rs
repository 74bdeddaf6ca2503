//! Candlelight - Concert FAQ Assistant
//!
//! A retrieval-augmented assistant that answers questions about Candlelight
//! concerts, venues and tickets from a curated FAQ dataset.
//!
//! # Overview
//!
//! Candlelight allows you to:
//! - Build a persisted vector index from a CSV, TSV or JSON Lines FAQ
//! - Ask standalone questions and get answers with their FAQ sources
//! - Hold a conversation where follow-ups are rewritten using the chat history
//! - Serve the same answering chain over HTTP
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings, prompts and credentials
//! - `dataset` - FAQ dataset loading
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction and SQLite persistence
//! - `llm` - Chat model abstraction
//! - `rag` - Question condensing, retrieval and answering
//! - `knowledge_base` - Building and opening the index
//!
//! # Example
//!
//! ```rust,no_run
//! use candlelight::config::{Credentials, Settings};
//! use candlelight::knowledge_base::KnowledgeBase;
//! use candlelight::llm::OpenAIChatModel;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::from_env(&settings);
//!     let model = Arc::new(OpenAIChatModel::new(&settings.llm, credentials.llm()?)?);
//!
//!     let kb = KnowledgeBase::new(settings, &credentials)?;
//!     kb.build(&kb.configured_dataset()).await?;
//!
//!     let chain = kb.answer_chain(model).await?;
//!     let response = chain.answer("Do you offer a JavaScript course?", &[]).await?;
//!     println!("{}", response.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod knowledge_base;
pub mod llm;
pub mod openai;
pub mod rag;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{CandlelightError, Result};
