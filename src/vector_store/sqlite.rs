//! SQLite-based vector store implementation.
//!
//! Documents and their embeddings live in a single SQLite file; cosine
//! similarity is computed in Rust over every row, which is plenty for a FAQ.

use super::{rank, Document, IndexManifest, SearchResult, VectorStore};
use crate::error::{CandlelightError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        row_number INTEGER NOT NULL,
        source TEXT NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_row ON documents(row_number);

    CREATE TABLE IF NOT EXISTS index_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

const MANIFEST_KEY: &str = "manifest";

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a writable store at `path`.
    #[instrument(skip_all)]
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an existing store for querying.
    #[instrument(skip_all)]
    pub fn open_read_only(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CandlelightError::IndexNotFound(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let has_documents: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'documents')",
            [],
            |row| row.get(0),
        )?;
        if !has_documents {
            return Err(CandlelightError::VectorStore(format!(
                "{} is not a Candlelight index",
                path.display()
            )));
        }

        debug!("Opened SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CandlelightError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn load_documents(conn: &Connection) -> Result<Vec<Document>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, row_number, source, content, embedding, indexed_at
            FROM documents
            ORDER BY row_number
            "#,
        )?;

        let docs = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let row_number: i64 = row.get(1)?;
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let indexed_at_str: String = row.get(5)?;

            Ok(Document {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                row: usize::try_from(row_number).unwrap_or_default(),
                source: row.get(2)?,
                content: row.get(3)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        Ok(docs.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let row_number = i64::try_from(doc.row).map_err(|_| {
                CandlelightError::VectorStore(format!("Row number {} is too large", doc.row))
            })?;

            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, row_number, source, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    doc.id.to_string(),
                    row_number,
                    doc.source,
                    doc.content,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let docs = Self::load_documents(&conn)?;
        let results = rank(docs, query_embedding, limit, None);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let docs = Self::load_documents(&conn)?;
        let results = rank(docs, query_embedding, limit, Some(min_score));
        debug!("Found {} documents scoring at least {}", results.len(), min_score);
        Ok(results)
    }

    async fn documents(&self) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        Self::load_documents(&conn)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn manifest(&self) -> Result<Option<IndexManifest>> {
        let conn = self.lock()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = ?1",
                params![MANIFEST_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|json| serde_json::from_str(&json).map_err(CandlelightError::from))
            .transpose()
    }

    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
            params![MANIFEST_KEY, serde_json::to_string(manifest)?],
        )?;
        Ok(())
    }
}
