//! HTTP API gateway for fraudhound.
//!
//! Exposes the investigation service over REST + SSE:
//!
//! - `POST /v1/analyze`          — run an investigation, get the result
//! - `POST /v1/analyze/stream`   — run an investigation, get an SSE stream
//! - `GET  /v1/executions/{id}`  — execution state snapshot
//! - `POST /v1/executions/{id}/cancel` — cooperative cancellation
//! - `GET  /v1/tools`            — list registered tools
//! - `GET  /health`              — liveness check
//!
//! Built on Axum. Transport framing and authentication are out of scope;
//! the layers here are CORS and HTTP trace logging.

pub mod api;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use fraudhound_engine::InvestigationService;

/// Shared gateway state.
pub struct GatewayState {
    pub service: Arc<InvestigationService>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/v1", api::v1_router(state))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn serve(
    state: SharedState,
    config: &fraudhound_config::GatewayConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: i64,
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}
