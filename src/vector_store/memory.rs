//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, Document, IndexManifest, SearchResult, VectorStore};
use crate::error::{CandlelightError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory vector store.
#[derive(Default)]
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    manifest: RwLock<Option<IndexManifest>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> CandlelightError {
    CandlelightError::VectorStore(format!("Lock poisoned: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().map_err(poisoned)?;
        for doc in docs {
            store.insert(doc.id, doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(rank(docs.values().cloned(), query_embedding, limit, None))
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(rank(docs.values().cloned(), query_embedding, limit, Some(min_score)))
    }

    async fn documents(&self) -> Result<Vec<Document>> {
        let docs = self.documents.read().map_err(poisoned)?;
        let mut result: Vec<Document> = docs.values().cloned().collect();
        result.sort_by_key(|d| d.row);
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(docs.len())
    }

    async fn manifest(&self) -> Result<Option<IndexManifest>> {
        Ok(self.manifest.read().map_err(poisoned)?.clone())
    }

    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()> {
        *self.manifest.write().map_err(poisoned)? = Some(manifest.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let doc1 = Document::new(0, "Hello?".into(), "Hello world".into(), vec![1.0, 0.0, 0.0]);
        let doc2 = Document::new(1, "Bye?".into(), "Goodbye world".into(), vec![0.0, 1.0, 0.0]);

        store.upsert_batch(&[doc2, doc1]).await.unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);

        let filtered = store
            .search_with_threshold(&[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].document.source, "Hello?");

        let docs = store.documents().await.unwrap();
        assert_eq!(docs[0].row, 0);
        assert_eq!(docs[1].row, 1);

        assert!(store.manifest().await.unwrap().is_none());
    }
}
