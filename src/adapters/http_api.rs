//! HTTP intake surface for routing intents.
//!
//! The assembler is shared behind a `tokio::sync::Mutex`, which makes every
//! submission (and the delivery that follows it) run one at a time. A
//! submission whose delivery fails is rolled back before the 500 is returned.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::{
    config::models::RoutingIntent,
    core::{
        error::XdsError,
        snapshot::{Snapshot, SnapshotAssembler},
    },
    ports::snapshot_sink::SnapshotSink,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    assembler: Arc<Mutex<SnapshotAssembler>>,
    sink: Option<Arc<dyn SnapshotSink>>,
}

impl AppState {
    pub fn new(assembler: SnapshotAssembler) -> Self {
        Self {
            assembler: Arc::new(Mutex::new(assembler)),
            sink: None,
        }
    }

    /// Publish every accepted snapshot to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn assembler(&self) -> Arc<Mutex<SnapshotAssembler>> {
        self.assembler.clone()
    }
}

/// Error rendered as `{ "error": "..." }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<XdsError> for ApiError {
    fn from(err: XdsError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<eyre::Report> for ApiError {
    fn from(err: eyre::Report) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the intake router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/intents", post(submit_intent))
        .route("/v1/snapshot", get(get_snapshot))
        .route("/v1/snapshot/clusters", get(get_clusters_envelope))
        .route("/v1/snapshot/routes", get(get_routes_envelope))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let assembler = state.assembler.lock().await;
    Json(json!({
        "status": "ok",
        "clusters": assembler.clusters().len(),
        "routes": assembler.routes().len(),
    }))
}

async fn submit_intent(
    State(state): State<AppState>,
    Json(intent): Json<RoutingIntent>,
) -> Result<Json<Snapshot>, ApiError> {
    let mut assembler = state.assembler.lock().await;
    let accepted = assembler.len();

    let snapshot = assembler.submit_intent(&intent).inspect_err(|e| {
        tracing::warn!(origin = %intent.origin, prefix = %intent.prefix, "Rejected intent: {}", e);
    })?;

    if let Some(sink) = &state.sink {
        if let Err(e) = sink.publish(&snapshot).await {
            assembler.truncate(accepted);
            tracing::error!(
                origin = %intent.origin,
                prefix = %intent.prefix,
                "Delivery failed, intent rolled back: {:#}",
                e
            );
            return Err(e.into());
        }
    }

    Ok(Json(snapshot))
}

async fn get_snapshot(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let assembler = state.assembler.lock().await;
    Ok(Json(assembler.build()?))
}

async fn get_clusters_envelope(State(state): State<AppState>) -> Result<Response, ApiError> {
    let assembler = state.assembler.lock().await;
    Ok(json_text(assembler.render_clusters_envelope()?))
}

async fn get_routes_envelope(State(state): State<AppState>) -> Result<Response, ApiError> {
    let assembler = state.assembler.lock().await;
    Ok(json_text(assembler.render_routes_envelope()?))
}

fn json_text(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
