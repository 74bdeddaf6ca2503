//! Deterministic stand-ins for the remote services, shared by unit tests.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};
use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Rows of the sample FAQ: (prompt, response).
pub const FAQ_ROWS: [(&str, &str); 4] = [
    (
        "Do you offer a JavaScript course?",
        "Yes, we offer a JavaScript course for beginners.",
    ),
    (
        "What is the dress code?",
        "There is no strict dress code; smart casual is recommended.",
    ),
    (
        "Can I bring children?",
        "Children aged 8 and older are welcome with an adult.",
    ),
    (
        "Is the venue wheelchair accessible?",
        "Most venues are accessible; check your ticket page.",
    ),
];

/// The sample FAQ as CSV text.
pub fn faq_csv() -> String {
    let mut csv = String::from("prompt,response\n");
    for (prompt, response) in FAQ_ROWS {
        csv.push_str(&format!("\"{}\",\"{}\"\n", prompt, response));
    }
    csv
}

/// An in-memory store holding the sample FAQ.
pub async fn faq_store(embedder: &dyn Embedder) -> Arc<dyn VectorStore> {
    let contents: Vec<String> = FAQ_ROWS
        .iter()
        .map(|(prompt, response)| format!("prompt: {}\nresponse: {}", prompt, response))
        .collect();
    let embeddings = embedder.embed_batch(&contents).await.unwrap();

    let docs: Vec<Document> = FAQ_ROWS
        .iter()
        .zip(contents)
        .zip(embeddings)
        .enumerate()
        .map(|(row, (((prompt, _), content), embedding))| {
            Document::new(row, prompt.to_string(), content, embedding)
        })
        .collect();

    let store = MemoryVectorStore::new();
    store.upsert_batch(&docs).await.unwrap();
    Arc::new(store)
}

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension.
pub struct HashEmbedder {
    model: String,
    dimensions: usize,
    queries: Mutex<Vec<String>>,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::named("hash-embedder")
    }

    pub fn named(model: &str) -> Self {
        Self {
            model: model.to_string(),
            dimensions: 1024,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Texts passed to `embed`, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            // FNV-1a
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in word.to_lowercase().bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0100_0000_01b3);
            }
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.queries.lock().unwrap().push(text.to_string());
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Embedder that returns the same vector for every text.
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.vector.clone())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }

    fn model(&self) -> &str {
        "fixed"
    }
}

/// Chat model that replays canned replies and records every request.
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request received, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "I don't know.".to_string()))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
