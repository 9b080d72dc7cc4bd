//! REST API endpoints for ingestion and the polling dashboard

use super::error::ApiError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use logdeck_store::{EventId, IngestBatch, LogEvent, LogQuery, LogService, QueryParams};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// API state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub service: LogService,
    pub metrics: Option<PrometheusHandle>,
}

impl ApiState {
    pub fn new(service: LogService) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Response body of `GET /api/logs`
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<Arc<LogEvent>>,
    pub total: usize,
    pub filtered: usize,
    pub error_count: usize,
    pub current_screen: String,
    pub current_user: String,
    pub categories: BTreeMap<String, usize>,
    pub has_more: bool,
    /// Events newer than `after` were evicted before this poll
    pub has_gap: bool,
    pub oldest_id: Option<EventId>,
    pub latest_id: EventId,
}

/// Create the API router with its middleware stack
pub fn create_router(state: ApiState, enable_cors: bool) -> Router {
    with_middleware(api_routes(state), enable_cors)
}

/// Route table without middleware
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        // Dashboard page
        .route("/", get(serve_dashboard))

        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))

        // Log endpoints
        .route("/api/logs", get(query_logs).post(ingest_logs))
        .route("/api/logs/clear", post(clear_logs))

        .with_state(state)
}

/// Panic recovery, request tracing and optional CORS around `router`
pub fn with_middleware(router: Router, enable_cors: bool) -> Router {
    let router = router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "logdeck",
        "logs_count": state.service.len(),
        "stats": state.service.stats(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Receive a batch of events from a client
async fn ingest_logs(
    State(state): State<ApiState>,
    payload: Result<Json<IngestBatch>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(batch) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let receipt = state.service.ingest(batch)?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "received": receipt.received,
        "total": receipt.total,
    })))
}

/// Filtered, cursor-bounded view of the store
async fn query_logs(
    State(state): State<ApiState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<LogsResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let query = LogQuery::try_from(params)?;
    let view = state.service.view(&query);
    let has_gap = query
        .after
        .map_or(false, |after| view.summary.has_gap_after(after));

    Ok(Json(LogsResponse {
        logs: view.page.events,
        total: view.summary.total,
        filtered: view.page.filtered,
        error_count: view.summary.error_count,
        current_screen: view.current_screen,
        current_user: view.current_user,
        categories: view.summary.categories,
        has_more: view.page.has_more,
        has_gap,
        oldest_id: view.summary.oldest_id,
        latest_id: view.summary.latest_id,
    }))
}

/// Empty the store
async fn clear_logs(State(state): State<ApiState>) -> Json<serde_json::Value> {
    state.service.clear();
    Json(serde_json::json!({ "status": "success" }))
}

/// Prometheus text exposition
async fn render_metrics(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Metrics recorder not installed".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

/// Serve the dashboard HTML page
async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("../../static/dashboard.html"))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    ApiError::Internal(detail).into_response()
}
