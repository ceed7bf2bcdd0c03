//! The v1 API — analysis, streaming analysis, executions, tools.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;

use fraudhound_core::assessment::FraudAssessment;
use fraudhound_core::document::{Document, DocumentBundle, DocumentKind};
use fraudhound_core::error::EngineError;
use fraudhound_core::execution::ExecutionState;
use fraudhound_engine::InvestigationOptions;

use crate::SharedState;

/// SSE keep-alive cadence — comment frames every 5 s keep idle gaps from
/// looking like a dead connection, independent of investigation progress.
const KEEP_ALIVE_SECS: u64 = 5;

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/analyze/stream", post(analyze_stream_handler))
        .route("/executions/{id}", get(get_execution_handler))
        .route("/executions/{id}/cancel", post(cancel_execution_handler))
        .route("/tools", get(list_tools_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentDto {
    pub filename: String,
    /// Kind tag; omitted documents are classified during observation.
    #[serde(default)]
    pub document_type: Option<String>,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub bundle_id: Option<String>,
    pub documents: Vec<DocumentDto>,
    #[serde(default)]
    pub options: OptionsDto,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OptionsDto {
    #[serde(default)]
    pub max_iterations: Option<u32>,
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub bundle_id: String,
    pub execution_id: String,
    pub execution: ExecutionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<FraudAssessment>,
    pub processing_time_ms: i64,
    pub documents_processed: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
struct ToolDto {
    name: String,
    description: String,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolDto>,
}

impl AnalyzeRequest {
    fn into_bundle(self) -> (DocumentBundle, InvestigationOptions) {
        let documents = self
            .documents
            .into_iter()
            .map(|d| {
                let kind = d
                    .document_type
                    .as_deref()
                    .map(DocumentKind::parse)
                    .unwrap_or(DocumentKind::Other);
                let mut doc = Document::new(d.filename, kind, d.content);
                doc.metadata = d.metadata;
                doc
            })
            .collect();

        let bundle = match self.bundle_id {
            Some(id) => DocumentBundle::new(id, documents),
            None => DocumentBundle::with_generated_id(documents),
        };
        let options = InvestigationOptions {
            max_iterations: self.options.max_iterations,
            confidence_threshold: self.options.confidence_threshold,
        };
        (bundle, options)
    }
}

fn engine_error_response(e: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        EngineError::InvalidCorpus(_) => StatusCode::BAD_REQUEST,
        EngineError::ExecutionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// `POST /v1/analyze` — run an investigation to completion.
async fn analyze_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let started = chrono::Utc::now();
    let (bundle, options) = payload.into_bundle();
    let bundle_id = bundle.bundle_id.clone();
    let documents_processed = bundle.len();

    info!(bundle = %bundle_id, documents = documents_processed, "Analysis request");

    let execution = state
        .service
        .start_investigation(bundle, options)
        .await
        .map_err(engine_error_response)?;

    Ok(Json(AnalyzeResponse {
        success: true,
        bundle_id,
        execution_id: execution.execution_id.clone(),
        assessment: execution.assessment.clone(),
        processing_time_ms: (chrono::Utc::now() - started).num_milliseconds(),
        documents_processed,
        execution,
    }))
}

/// `POST /v1/analyze/stream` — run an investigation, streaming progress
/// as SSE events in generation order, with periodic keep-alive comments.
async fn analyze_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<
    Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>,
    (StatusCode, Json<ErrorResponse>),
> {
    let (bundle, options) = payload.into_bundle();
    info!(bundle = %bundle.bundle_id, "Streaming analysis request");

    let (_execution_id, rx) = state
        .service
        .start_investigation_streaming(bundle, options)
        .await
        .map_err(engine_error_response)?;

    let stream = ReceiverStream::new(rx).map(|event| {
        let event_type = event.event_type().to_string();
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event_type).data(data))
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keepalive"),
    ))
}

/// `GET /v1/executions/{id}` — snapshot of a live or finished execution.
async fn get_execution_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionState>, (StatusCode, Json<ErrorResponse>)> {
    match state.service.get_execution(&id).await {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Err(engine_error_response(EngineError::ExecutionNotFound(id))),
    }
}

/// `POST /v1/executions/{id}/cancel` — request cooperative cancellation.
async fn cancel_execution_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if state.service.cancel(&id).await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(engine_error_response(EngineError::ExecutionNotFound(id)))
    }
}

/// `GET /v1/tools` — the registered tool vocabulary.
async fn list_tools_handler(State(state): State<SharedState>) -> Json<ToolListResponse> {
    let tools = state
        .service
        .tools()
        .descriptions()
        .into_iter()
        .map(|(id, description)| ToolDto {
            name: id.as_str().to_string(),
            description,
        })
        .collect();
    Json(ToolListResponse { tools })
}
