//! Health and Prometheus metrics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::SupplyStore;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `loading`, `ready` or `degraded`.
    pub reports: &'static str,
}

/// GET /health: process liveness plus the state of the live reports.
pub async fn health<S: SupplyStore>(State(state): State<Arc<AppState<S>>>) -> Json<HealthResponse> {
    let current = state.balances.current();
    let reports = if current.is_degraded() {
        "degraded"
    } else if current.loading {
        "loading"
    } else {
        "ready"
    };

    Json(HealthResponse {
        status: "ok",
        reports,
    })
}

/// GET /metrics: Prometheus text exposition.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
