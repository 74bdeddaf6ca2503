//! Knowledge-base lifecycle: building the FAQ index and opening it for queries.

use crate::config::{Credentials, Prompts, Settings};
use crate::dataset::{load_dataset, DatasetSpec, FaqRecord};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{CandlelightError, Result};
use crate::llm::ChatModel;
use crate::rag::{AnswerChain, Retriever};
use crate::vector_store::{Document, IndexManifest, SqliteVectorStore, VectorStore};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Builds and opens the persisted FAQ index.
pub struct KnowledgeBase {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
}

impl KnowledgeBase {
    /// Create a knowledge base using the configured embedding service.
    pub fn new(settings: Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let embedder = Arc::new(OpenAIEmbedder::new(
            &settings.embedding,
            credentials.embedding()?,
            Duration::from_secs(settings.llm.request_timeout_secs),
        )?);

        Ok(Self {
            settings,
            prompts,
            embedder,
        })
    }

    /// Create a knowledge base with custom components.
    pub fn with_components(settings: Settings, prompts: Prompts, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            settings,
            prompts,
            embedder,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    /// Path of the persisted index.
    pub fn index_path(&self) -> PathBuf {
        self.settings.index_path()
    }

    /// Whether an index has been built.
    pub fn index_exists(&self) -> bool {
        self.index_path().is_file()
    }

    /// The dataset described by the settings.
    pub fn configured_dataset(&self) -> DatasetSpec {
        DatasetSpec {
            path: self.settings.dataset_path(),
            source_column: self.settings.dataset.source_column.clone(),
            format: self.settings.dataset.format,
        }
    }

    /// Build the index from a dataset, replacing any existing one.
    ///
    /// The new index is written next to the old one and renamed into place,
    /// so a failed build leaves the previous index untouched.
    #[instrument(skip(self), fields(dataset = %dataset.path.display()))]
    pub async fn build(&self, dataset: &DatasetSpec) -> Result<BuildReport> {
        let started = Instant::now();

        let records = load_dataset(dataset)?;
        if records.is_empty() {
            return Err(CandlelightError::InvalidInput(format!(
                "{} contains no rows",
                dataset.path.display()
            )));
        }
        info!("Loaded {} FAQ rows", records.len());

        let texts: Vec<String> = records.iter().map(FaqRecord::content).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != records.len() {
            return Err(CandlelightError::Embedding(format!(
                "Expected {} embeddings, received {}",
                records.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(CandlelightError::Embedding(
                "Embedding service returned vectors of inconsistent length".to_string(),
            ));
        }

        let documents: Vec<Document> = records
            .iter()
            .zip(embeddings)
            .map(|(record, embedding)| Document::from_record(record, embedding))
            .collect();

        let manifest = IndexManifest {
            embedding_model: self.embedder.model().to_string(),
            dimensions,
            dataset_path: dataset.path.display().to_string(),
            source_column: dataset.source_column.clone(),
            document_count: documents.len(),
            built_at: Utc::now(),
        };

        let index_dir = self.settings.index_dir();
        std::fs::create_dir_all(&index_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".index-")
            .suffix(".db")
            .tempfile_in(&index_dir)?;

        {
            let store = SqliteVectorStore::create(staging.path())?;
            store.upsert_batch(&documents).await?;
            store.write_manifest(&manifest).await?;
        }

        let index_path = self.index_path();
        staging
            .persist(&index_path)
            .map_err(|e| CandlelightError::Io(e.error))?;

        let report = BuildReport {
            documents: documents.len(),
            dimensions,
            index_path,
            elapsed: started.elapsed(),
        };
        info!(
            "Indexed {} documents ({} dimensions) in {:?}",
            report.documents, report.dimensions, report.elapsed
        );
        Ok(report)
    }

    /// Open the persisted index for querying.
    pub async fn open_store(&self) -> Result<Arc<SqliteVectorStore>> {
        let (store, _) = self.open_checked().await?;
        Ok(store)
    }

    /// Open the index and verify it was built by the configured embedder.
    async fn open_checked(&self) -> Result<(Arc<SqliteVectorStore>, Option<IndexManifest>)> {
        let store = SqliteVectorStore::open_read_only(&self.index_path())?;
        let manifest = store.manifest().await?;

        match &manifest {
            Some(manifest) if manifest.embedding_model != self.embedder.model() => {
                return Err(CandlelightError::IndexMismatch(format!(
                    "index was built with '{}' but '{}' is configured",
                    manifest.embedding_model,
                    self.embedder.model()
                )));
            }
            Some(manifest) => {
                if let Some(configured) = self.settings.embedding.dimensions {
                    if configured as usize != manifest.dimensions {
                        return Err(CandlelightError::IndexMismatch(format!(
                            "index stores {}-dimensional embeddings but {} are configured",
                            manifest.dimensions, configured
                        )));
                    }
                }
            }
            None => warn!("Index has no manifest; cannot verify its embedding model"),
        }

        Ok((Arc::new(store), manifest))
    }

    /// A retriever over the persisted index.
    pub async fn retriever(&self) -> Result<Retriever> {
        let (store, manifest) = self.open_checked().await?;
        let retriever = Retriever::from_settings(store, self.embedder(), &self.settings.retrieval);

        Ok(match manifest {
            Some(manifest) => retriever.with_dimensions(manifest.dimensions),
            None => retriever,
        })
    }

    /// The full answering chain over the persisted index.
    pub async fn answer_chain(&self, model: Arc<dyn ChatModel>) -> Result<AnswerChain> {
        AnswerChain::new(model, self.retriever().await?, &self.prompts)
    }

    /// Describe the persisted index.
    pub async fn status(&self) -> Result<IndexStatus> {
        IndexStatus::load(self.index_path()).await
    }
}

/// Result of building the index.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of documents written.
    pub documents: usize,
    /// Length of each embedding vector.
    pub dimensions: usize,
    /// Where the index was written.
    pub index_path: PathBuf,
    /// How long the build took.
    pub elapsed: Duration,
}

/// What is known about the persisted index.
#[derive(Debug)]
pub struct IndexStatus {
    pub path: PathBuf,
    pub manifest: Option<IndexManifest>,
    /// `None` when no index exists.
    pub document_count: Option<usize>,
}

impl IndexStatus {
    /// Read the index at `path`; a missing file is not an error.
    pub async fn load(path: PathBuf) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self {
                path,
                manifest: None,
                document_count: None,
            });
        }

        let store = SqliteVectorStore::open_read_only(&path)?;
        Ok(Self {
            manifest: store.manifest().await?,
            document_count: Some(store.document_count().await?),
            path,
        })
    }

    pub fn exists(&self) -> bool {
        self.document_count.is_some()
    }
}
