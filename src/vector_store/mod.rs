//! Vector store abstraction for Candlelight.
//!
//! Provides a trait-based interface over the persisted SQLite index and an
//! in-memory store used for tests.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::dataset::FaqRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A FAQ entry stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Row of the dataset this document came from.
    pub row: usize,
    /// Value of the designated source column.
    pub source: String,
    /// Text handed to the model as context.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(row: usize, source: String, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            row,
            source,
            content,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// Create a document for a dataset row.
    pub fn from_record(record: &FaqRecord, embedding: Vec<f32>) -> Self {
        Self::new(record.row, record.source.clone(), record.content(), embedding)
    }
}

/// A search result with score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Facts about how an index was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Embedding model used for every stored vector.
    pub embedding_model: String,
    /// Length of the stored vectors.
    pub dimensions: usize,
    /// Dataset the index was built from.
    pub dataset_path: String,
    /// Column used as the document source.
    pub source_column: String,
    /// Number of documents written.
    pub document_count: usize,
    /// When the build finished.
    pub built_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk insert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for the `limit` most similar documents.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search, dropping documents scoring below `min_score`.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// All documents, ordered by dataset row.
    async fn documents(&self) -> Result<Vec<Document>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;

    /// Read the build manifest, if one was written.
    async fn manifest(&self) -> Result<Option<IndexManifest>>;

    /// Store the build manifest.
    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score, filter and rank documents. Ties keep dataset row order.
pub(crate) fn rank<I>(
    docs: I,
    query_embedding: &[f32],
    limit: usize,
    min_score: Option<f32>,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = Document>,
{
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|doc| {
            let score = cosine_similarity(query_embedding, &doc.embedding);
            SearchResult { document: doc, score }
        })
        .filter(|r| min_score.map_or(true, |min| r.score >= min))
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.document.row.cmp(&b.document.row))
    });
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_document_from_record() {
        let record = FaqRecord {
            row: 3,
            source: "Is there parking?".to_string(),
            fields: vec![
                ("prompt".to_string(), "Is there parking?".to_string()),
                ("response".to_string(), " Yes, nearby. ".to_string()),
            ],
        };

        let doc = Document::from_record(&record, vec![0.5, 0.5]);
        assert_eq!(doc.row, 3);
        assert_eq!(doc.source, "Is there parking?");
        assert_eq!(doc.content, "prompt: Is there parking?\nresponse: Yes, nearby.");
    }

    #[test]
    fn test_rank_breaks_ties_by_row() {
        let docs = vec![
            Document::new(1, "b".into(), "b".into(), vec![1.0, 0.0]),
            Document::new(0, "a".into(), "a".into(), vec![1.0, 0.0]),
            Document::new(2, "c".into(), "c".into(), vec![0.0, 1.0]),
        ];

        let results = rank(docs, &[1.0, 0.0], 10, Some(0.5));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.source, "a");
        assert_eq!(results[1].document.source, "b");
    }
}
