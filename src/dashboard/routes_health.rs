//! # Health & Observability Endpoints
//!
//! | Endpoint | Purpose |
//! |----------|---------|
//! | `GET /healthz` | Liveness: the process is serving HTTP |
//! | `GET /metrics` | Prometheus scraping endpoint |

use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

/// Liveness probe. No dependencies are checked.
pub async fn handler_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// All registered metrics in the OpenMetrics text format.
pub async fn handler_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.prom_metrics.encode();
    (
        StatusCode::OK,
        [(
            "content-type",
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    )
}
