//! # Dashboard — HTTP API Server
//!
//! Axum server exposing each search as a GET endpoint with query-string
//! parameters and JSON responses. `/api/q1/stream` pushes Kaprekar progress as
//! server-sent events. Searches are CPU-bound and run on the blocking pool, one
//! per request, so the async workers stay free to serve other clients.
//!
//! | Route | Search |
//! |-------|--------|
//! | `GET /api/q1/stream?start&end` | Kaprekar (SSE) |
//! | `GET /api/q2?start&end` | Repunit |
//! | `GET /api/q3?start&end` | Mersenne (updates the correlation cache) |
//! | `GET /api/q4?startP&endP` | Brocard |
//! | `GET /api/q5?min_digits` | Palindromic |
//! | `GET /api/q6?p_values` | Perfect numbers |
//! | `GET /api/q7?part=a&start&end` | Wieferich |
//! | `GET /api/q7?part=e&N` | Legendre |
//! | `GET /api/q7?part=f&N` | Oppermann |
//! | `GET /healthz`, `GET /metrics` | Liveness, OpenMetrics |

mod routes_health;
mod routes_searches;

use anyhow::{Context, Result};
use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};

use crate::config::ServerConfig;
use crate::correlation::MersenneCache;
use crate::prom_metrics;

pub struct AppState {
    pub config: ServerConfig,
    pub cache: MersenneCache,
    pub prom_metrics: prom_metrics::Metrics,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(AppState {
            config,
            cache: MersenneCache::new(),
            prom_metrics: prom_metrics::Metrics::new(),
        })
    }
}

/// Raw query parameters. Typed extraction would reject malformed numbers with
/// its own 400; these routes fall back to defaults instead.
pub(super) type Params = HashMap<String, String>;

/// Integer query parameter, or `default` when absent or malformed.
pub(super) fn int_param(params: &Params, key: &str, default: u64) -> u64 {
    match params.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(param = key, value = %raw, default, "malformed integer parameter, using default");
            default
        }),
    }
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

/// Run a search on the blocking pool; a panic inside it becomes a 500.
pub(super) async fn run_blocking<T, F>(search: &'static str, f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        warn!(search, error = %e, "search task failed");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} search failed: {}", search, e),
        )
    })
}

/// Records request latency, propagates or assigns `x-request-id`, and wraps the
/// request in a tracing span.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    // Label by route template so unknown paths cannot grow the histogram
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = std::time::Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let mut response = next.run(req).instrument(span).await;

    state
        .prom_metrics
        .http_request_duration
        .get_or_create(&prom_metrics::RequestLabels {
            method,
            path: route,
            status: response.status().as_u16().to_string(),
        })
        .observe(start.elapsed().as_secs_f64());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/q1/stream", get(routes_searches::handler_q1_stream))
        .route("/api/q2", get(routes_searches::handler_q2_repunit))
        .route("/api/q3", get(routes_searches::handler_q3_mersenne))
        .route("/api/q4", get(routes_searches::handler_q4_brocard))
        .route("/api/q5", get(routes_searches::handler_q5_palindromic))
        .route("/api/q6", get(routes_searches::handler_q6_perfect))
        .route("/api/q7", get(routes_searches::handler_q7_open_problems))
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/metrics", get(routes_health::handler_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::new())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<()> {
    config.validate()?;
    let addr = config.addr();
    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
