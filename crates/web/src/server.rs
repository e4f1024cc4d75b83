//! Web server implementation
//!
//! Stateless handlers over the currently-published snapshot. No handler
//! waits on an in-flight orchestrator iteration: readers take the last
//! complete snapshot out of the store and work from that.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use sentinel_common::{summary, SnapshotStore};

use crate::artifacts::{self, ArtifactRoots};
use crate::metrics::ScenarioMetrics;

/// Web server state
#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

struct WebServerState {
    /// Read handle on the published snapshot
    store: SnapshotStore,
    /// Scrape-time scenario gauges
    metrics: ScenarioMetrics,
    /// Evidence directories on disk
    artifacts: ArtifactRoots,
    /// Process start, for the liveness uptime field
    started_at: Instant,
}

impl WebServer {
    pub fn new(store: SnapshotStore, artifacts: ArtifactRoots) -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(WebServerState {
                store,
                metrics: ScenarioMetrics::new()?,
                artifacts,
                started_at: Instant::now(),
            }),
        })
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(summary_handler))
            .route("/debug", get(debug_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            // Evidence directories: index pages plus static files
            .route("/videos", get(videos_index_handler))
            .route("/videos/*path", get(videos_file_handler))
            .route("/screenshots", get(screenshots_index_handler))
            .route("/screenshots/*path", get(screenshots_file_handler))
            .route("/status", get(status_index_handler))
            .route("/status/*path", get(status_file_handler))
            .fallback(not_found_handler)
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("Exposition service listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Base URL as seen by the caller, from proxy and host headers
fn base_url(headers: &HeaderMap) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}

// ============================================================================
// Handlers
// ============================================================================

async fn summary_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let snapshot = state.store.current();
    Json(summary::project(&snapshot, &base_url(&headers)))
}

async fn debug_handler(State(state): State<Arc<WebServerState>>) -> impl IntoResponse {
    Json((*state.store.current()).clone())
}

async fn health_handler(State(state): State<Arc<WebServerState>>) -> impl IntoResponse {
    // Liveness of the agent, not of the monitored application: failing
    // scenarios are data, and this stays ok while they fail.
    Json(serde_json::json!({
        "status": "ok",
        "service": "sentinel",
        "version": sentinel_common::VERSION,
        "uptimeMs": state.started_at.elapsed().as_millis() as u64,
    }))
}

async fn metrics_handler(State(state): State<Arc<WebServerState>>) -> Response {
    state.metrics.observe(&state.store.current());
    match state.metrics.gather() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("metrics exposition failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "exposition failed").into_response()
        }
    }
}

async fn videos_index_handler(State(state): State<Arc<WebServerState>>) -> Response {
    artifacts::list_dir(&state.artifacts.videos, "/videos").await
}

async fn videos_file_handler(
    State(state): State<Arc<WebServerState>>,
    UrlPath(path): UrlPath<String>,
) -> Response {
    artifacts::serve_file(&state.artifacts.videos, &path).await
}

async fn screenshots_index_handler(State(state): State<Arc<WebServerState>>) -> Response {
    artifacts::list_dir(&state.artifacts.screenshots, "/screenshots").await
}

async fn screenshots_file_handler(
    State(state): State<Arc<WebServerState>>,
    UrlPath(path): UrlPath<String>,
) -> Response {
    artifacts::serve_file(&state.artifacts.screenshots, &path).await
}

async fn status_index_handler(State(state): State<Arc<WebServerState>>) -> Response {
    artifacts::list_dir(&state.artifacts.report, "/status").await
}

async fn status_file_handler(
    State(state): State<Arc<WebServerState>>,
    UrlPath(path): UrlPath<String>,
) -> Response {
    artifacts::serve_file(&state.artifacts.report, &path).await
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
