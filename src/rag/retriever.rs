//! Similarity retrieval over the knowledge base.

use crate::config::{RetrievalSettings, ThresholdPolicy};
use crate::embedding::Embedder;
use crate::error::{CandlelightError, Result};
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Fetches the FAQ entries most similar to a query.
pub struct Retriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    score_threshold: f32,
    policy: ThresholdPolicy,
    dimensions: Option<usize>,
}

impl Retriever {
    /// Create a retriever with the default settings.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self::from_settings(vector_store, embedder, &RetrievalSettings::default())
    }

    /// Create a retriever configured from settings.
    pub fn from_settings(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        settings: &RetrievalSettings,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: settings.top_k,
            score_threshold: settings.score_threshold,
            policy: settings.policy,
            dimensions: None,
        }
    }

    /// Set the maximum number of documents returned.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score.
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Set how the threshold is applied.
    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Require query embeddings of the width stored in the index.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    /// Embed the query and return the matching documents, best first.
    #[instrument(skip(self), fields(policy = %self.policy, threshold = self.score_threshold))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;
        if let Some(expected) = self.dimensions {
            if query_embedding.len() != expected {
                return Err(CandlelightError::IndexMismatch(format!(
                    "query embedding has {} dimensions but the index stores {}",
                    query_embedding.len(),
                    expected
                )));
            }
        }

        let results = match self.policy {
            ThresholdPolicy::Cutoff => {
                self.vector_store
                    .search_with_threshold(&query_embedding, self.top_k, self.score_threshold)
                    .await?
            }
            ThresholdPolicy::TopK => self.vector_store.search(&query_embedding, self.top_k).await?,
        };

        debug!("Retrieved {} documents", results.len());
        Ok(results)
    }
}

/// Join retrieved documents into the `{context}` block of the answer prompt.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedEmbedder;
    use crate::vector_store::{cosine_similarity, Document, MemoryVectorStore};

    async fn store_with(docs: Vec<Document>) -> Arc<dyn VectorStore> {
        let store = MemoryVectorStore::new();
        store.upsert_batch(&docs).await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_threshold_boundary() {
        let query = vec![1.0, 0.0];
        let near = Document::new(0, "near".into(), "near".into(), vec![1.0, 0.0]);
        let edge = Document::new(1, "edge".into(), "edge".into(), vec![1.0, 1.0]);
        let far = Document::new(2, "far".into(), "far".into(), vec![0.0, 1.0]);
        let edge_score = cosine_similarity(&query, &edge.embedding);

        let store = store_with(vec![near, edge, far]).await;
        let embedder = Arc::new(FixedEmbedder::new(query.clone()));

        // A threshold equal to the score keeps the document.
        let at = Retriever::new(store.clone(), embedder.clone())
            .with_top_k(10)
            .with_score_threshold(edge_score);
        let sources: Vec<_> = at
            .retrieve("q")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.document.source)
            .collect();
        assert_eq!(sources, vec!["near", "edge"]);

        // The next representable threshold above it drops the document.
        let above = Retriever::new(store, embedder)
            .with_top_k(10)
            .with_score_threshold(f32::from_bits(edge_score.to_bits() + 1));
        let sources: Vec<_> = above
            .retrieve("q")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.document.source)
            .collect();
        assert_eq!(sources, vec!["near"]);
    }

    #[tokio::test]
    async fn test_top_k_policy_ignores_threshold() {
        let store = store_with(vec![
            Document::new(0, "a".into(), "a".into(), vec![1.0, 0.0]),
            Document::new(1, "b".into(), "b".into(), vec![0.0, 1.0]),
            Document::new(2, "c".into(), "c".into(), vec![-1.0, 0.0]),
        ])
        .await;
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));

        let retriever = Retriever::new(store, embedder)
            .with_top_k(2)
            .with_score_threshold(0.9)
            .with_policy(ThresholdPolicy::TopK);
        let results = retriever.retrieve("q").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.source, "a");
        assert_eq!(results[1].document.source, "b");
    }

    #[tokio::test]
    async fn test_query_width_must_match_index() {
        let store = store_with(vec![Document::new(0, "a".into(), "a".into(), vec![1.0, 0.0])]).await;
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0, 0.0]));

        let retriever = Retriever::new(store.clone(), embedder.clone())
            .with_score_threshold(0.0)
            .with_dimensions(2);
        let err = retriever.retrieve("q").await.err();
        assert!(matches!(err, Some(CandlelightError::IndexMismatch(_))));

        let matching = Retriever::new(store, Arc::new(FixedEmbedder::new(vec![1.0, 0.0])))
            .with_dimensions(2);
        assert_eq!(matching.retrieve("q").await.unwrap().len(), 1);
    }

    #[test]
    fn test_format_context() {
        let results = vec![
            SearchResult {
                document: Document::new(0, "a".into(), "prompt: a\nresponse: 1".into(), vec![]),
                score: 0.9,
            },
            SearchResult {
                document: Document::new(1, "b".into(), "prompt: b\nresponse: 2".into(), vec![]),
                score: 0.8,
            },
        ];
        assert_eq!(
            format_context(&results),
            "prompt: a\nresponse: 1\n\nprompt: b\nresponse: 2"
        );
        assert_eq!(format_context(&[]), "");
    }
}
