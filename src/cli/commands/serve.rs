//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for building the knowledge base and asking
//! questions. Rebuilds hold the write half of a lock that every query
//! reads through, so a query never sees a half-swapped index.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::error::CandlelightError;
use crate::knowledge_base::KnowledgeBase;
use crate::llm::ChatModel;
use crate::rag::ChatTurn;
use crate::vector_store::SearchResult;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state.
struct AppState {
    kb: RwLock<KnowledgeBase>,
    model: Arc<dyn ChatModel>,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: &str,
    port: u16,
    settings: Settings,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings, credentials) {
        Output::error(&e.to_string());
        Output::info("Run 'candlelight doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = super::ask::chat_model(&settings, credentials, None)?;
    let kb = KnowledgeBase::new(settings, credentials)?;
    if !kb.index_exists() {
        Output::warning("No knowledge base yet; POST /build before asking questions.");
    }

    let app = router(Arc::new(AppState {
        kb: RwLock::new(kb),
        model,
    }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Candlelight API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Status", "GET  /status");
    Output::kv("Build", "POST /build");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/build", post(build))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    chat_history: Vec<ChatTurn>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    standalone_question: String,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    source: String,
    row: usize,
    score: f32,
    content: String,
}

impl From<SearchResult> for SourceInfo {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.document.source,
            row: result.document.row,
            score: result.score,
            content: result.document.content,
        }
    }
}

#[derive(Serialize)]
struct BuildResponse {
    documents: usize,
    dimensions: usize,
    elapsed_ms: u128,
}

#[derive(Serialize)]
struct StatusResponse {
    index_exists: bool,
    index_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    built_at: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: CandlelightError) -> Response {
    let status = match &e {
        CandlelightError::IndexNotFound(_) | CandlelightError::IndexMismatch(_) => {
            StatusCode::CONFLICT
        }
        CandlelightError::DatasetNotFound(_)
        | CandlelightError::Dataset(_)
        | CandlelightError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", e);
    }

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn status(State(state): State<Arc<AppState>>) -> Response {
    let kb = state.kb.read().await;
    match kb.status().await {
        Ok(status) => Json(StatusResponse {
            index_exists: status.exists(),
            index_path: status.path.display().to_string(),
            document_count: status.document_count,
            embedding_model: status.manifest.as_ref().map(|m| m.embedding_model.clone()),
            built_at: status.manifest.as_ref().map(|m| m.built_at.to_rfc3339()),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn build(State(state): State<Arc<AppState>>) -> Response {
    let kb = state.kb.write().await;
    let dataset = kb.configured_dataset();
    info!("Rebuilding index from {}", dataset.path.display());

    match kb.build(&dataset).await {
        Ok(report) => Json(BuildResponse {
            documents: report.documents,
            dimensions: report.dimensions,
            elapsed_ms: report.elapsed.as_millis(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    if req.question.trim().is_empty() {
        return error_response(CandlelightError::InvalidInput(
            "question must not be empty".to_string(),
        ));
    }

    let kb = state.kb.read().await;
    let chain = match kb.answer_chain(Arc::clone(&state.model)).await {
        Ok(chain) => chain,
        Err(e) => return error_response(e),
    };

    match chain.answer(&req.question, &req.chat_history).await {
        Ok(response) => Json(AskResponse {
            answer: response.answer,
            standalone_question: response.standalone_question,
            sources: response.sources.into_iter().map(SourceInfo::from).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::testing::{faq_csv, HashEmbedder, ScriptedChatModel};
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(replies: &[&str]) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let dataset_path = dir.path().join("faq.csv");
        std::fs::write(&dataset_path, faq_csv()).unwrap();

        let mut settings = Settings::default();
        settings.index.dir = dir.path().join("index").display().to_string();
        settings.dataset.path = dataset_path.display().to_string();
        settings.retrieval.score_threshold = 0.0;

        let kb = KnowledgeBase::with_components(
            settings,
            Prompts::default(),
            Arc::new(HashEmbedder::new()),
        );
        let model = Arc::new(ScriptedChatModel::new(replies.iter().copied()));
        let router = router(Arc::new(AppState {
            kb: RwLock::new(kb),
            model,
        }));
        (dir, router)
    }

    fn ask_request(body: serde_json::Value) -> Request<Body> {
        Request::post("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ask_before_build_conflicts() {
        let (_dir, app) = app(&[]);
        let response = app
            .oneshot(ask_request(serde_json::json!({ "question": "Hi?" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_build_then_ask_with_history() {
        let (_dir, app) = app(&["JavaScript course level for beginners", "Beginners."]);

        let response = app
            .clone()
            .oneshot(Request::post("/build").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["documents"], 4);

        let response = app
            .oneshot(ask_request(serde_json::json!({
                "question": "What level is it?",
                "chat_history": [{
                    "question": "Do you offer a JavaScript course?",
                    "answer": "Yes, we offer a JavaScript course."
                }]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["answer"], "Beginners.");
        assert_eq!(body["standalone_question"], "JavaScript course level for beginners");
        assert_eq!(
            body["sources"][0]["source"],
            "Do you offer a JavaScript course?"
        );
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected() {
        let (_dir, app) = app(&[]);
        let response = app
            .oneshot(ask_request(serde_json::json!({ "question": "  " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
