//! Prompt templates for Candlelight.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.
//! Templates use single-brace placeholders such as `{question}`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub condense: CondensePrompts,
    pub qa: QaPrompts,
}

/// Prompt that turns a follow-up question into a standalone one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CondensePrompts {
    /// Must contain `{chat_history}` and `{question}`.
    pub template: String,
}

impl Default for CondensePrompts {
    fn default() -> Self {
        Self {
            template: r#"Given the following chat history and a follow-up question, rephrase the question to be standalone.

Chat History:
{chat_history}

Follow-up question:
{question}"#
                .to_string(),
        }
    }
}

/// Prompts for answering from retrieved FAQ entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    /// System message. Must contain `{context}`.
    pub system: String,
    /// User message. Must contain `{question}`.
    pub user: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are the assistant of Candlelight Concerts. Use the following pieces of context from our FAQ to answer the user's question about concerts, venues or tickets.
If you don't know the answer, just say that you don't know, don't try to make up an answer.
----------------
{context}"#
                .to_string(),
            user: "{question}".to_string(),
        }
    }
}

impl Prompts {
    /// Load the default prompts, overridden by any files in `custom_dir`.
    pub fn load(custom_dir: Option<&str>) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let condense_path = custom_path.join("condense.toml");
            if condense_path.exists() {
                let content = std::fs::read_to_string(&condense_path)?;
                prompts.condense = toml::from_str(&content)?;
            }

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }
}
