//! HTTP API server with observability for the supply ledger.
//!
//! Serves the live expendable-balances report, per-item stock cards and
//! document number allocation, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use ledger::{ExpendableBalances, LedgerEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::{DocumentCounter, RecordStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Storage the server runs on: records to report over and document counters.
pub trait SupplyStore: RecordStore + DocumentCounter + Clone + 'static {}

impl<T: RecordStore + DocumentCounter + Clone + 'static> SupplyStore for T {}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: SupplyStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health::<S>))
        .route(
            "/reports/expendable-balances",
            get(routes::reports::balances::<S>),
        )
        .route(
            "/reports/expendable-balances/stream",
            get(routes::reports::balances_stream::<S>),
        )
        .route(
            "/reports/stock-cards/{item_id}",
            get(routes::reports::stock_card::<S>),
        )
        .route(
            "/document-numbers/{kind}",
            post(routes::documents::allocate::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state and starts the live balances report.
///
/// Must be called inside a Tokio runtime.
pub fn create_default_state<S: SupplyStore>(store: S, debounce: Duration) -> Arc<AppState<S>> {
    let engine = LedgerEngine::new(store.clone());
    let balances = engine.watch(ExpendableBalances::new(), debounce);

    Arc::new(AppState {
        engine,
        balances,
        store,
    })
}
