//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use api::routes::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Datelike, Utc};
use domain::{
    AcceptanceEvent, AcceptanceLineItem, AcceptanceStatus, Category, DocumentKind, IssuanceEvent,
    IssuanceLineItem, IssuanceStatus, Item,
};
use futures_util::StreamExt;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::{
    Collection, Document, DocumentCounter, InMemoryRecordStore, RecordId, RecordStore,
    RecordStoreError, RecordStoreExt,
};
use tokio::sync::broadcast;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Store whose reads of one collection always fail.
#[derive(Clone)]
struct FailingStore {
    inner: InMemoryRecordStore,
    failing: Collection,
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn put(&self, document: Document) -> record_store::Result<()> {
        self.inner.put(document).await
    }

    async fn get(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> record_store::Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> record_store::Result<bool> {
        self.inner.delete(collection, id).await
    }

    async fn list(&self, collection: Collection) -> record_store::Result<Vec<Document>> {
        if collection == self.failing {
            return Err(RecordStoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.list(collection).await
    }

    fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.inner.subscribe()
    }
}

#[async_trait]
impl DocumentCounter for FailingStore {
    async fn next_value(&self, kind: DocumentKind, year: i32) -> record_store::Result<u64> {
        self.inner.next_value(kind, year).await
    }
}

async fn seeded_store() -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    store
        .put_record(&Item::new("I1", "Ballpen", "OS-001", Category::Expendable).with_unit("piece"))
        .await
        .unwrap();
    store
        .put_record(&Item::new("I2", "Bond paper", "OS-002", Category::Expendable).with_unit("ream"))
        .await
        .unwrap();
    store
        .put_record(&Item::new("I3", "Laptop", "PPE-001", Category::CapitalOutlay))
        .await
        .unwrap();
    store
        .put_record(
            &AcceptanceEvent::new("IAR1", AcceptanceStatus::Completed)
                .with_number("IAR-2026-0001")
                .with_line(AcceptanceLineItem::new("I1", Category::Expendable, 100))
                .with_line(AcceptanceLineItem::new("I3", Category::CapitalOutlay, 2)),
        )
        .await
        .unwrap();
    store
        .put_record(
            &IssuanceEvent::new("RIS1", IssuanceStatus::Posted)
                .with_number("RIS-2026-0001")
                .with_office("Accounting")
                .with_line(IssuanceLineItem::new("I1", 30)),
        )
        .await
        .unwrap();
    store
        .put_record(
            &IssuanceEvent::new("RIS2", IssuanceStatus::Pending)
                .with_line(IssuanceLineItem::new("I1", 999)),
        )
        .await
        .unwrap();
    store
}

async fn setup_with_state<S: api::SupplyStore>(store: S) -> (axum::Router, Arc<AppState<S>>) {
    let state = api::create_default_state(store, Duration::ZERO);
    let app = api::create_app(state.clone(), get_metrics_handle());
    tokio::time::timeout(Duration::from_secs(5), state.balances.ready())
        .await
        .expect("report never finished loading");
    (app, state)
}

async fn setup() -> axum::Router {
    setup_with_state(seeded_store().await).await.0
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, json) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["reports"], "ready");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("ledger_report_recomputations_total"));
}

#[tokio::test]
async fn test_expendable_balances() {
    let app = setup().await;

    let (status, json) = get(app, "/reports/expendable-balances").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["loading"], false);
    assert_eq!(json["count"], 1);

    let row = &json["rows"][0];
    assert_eq!(row["item_id"], "I1");
    assert_eq!(row["description"], "Ballpen");
    assert_eq!(row["unit"], "piece");
    assert_eq!(row["total_received"], 100);
    assert_eq!(row["total_issued"], 30);
    assert_eq!(row["balance"], 70);
    assert_eq!(row["over_issued"], false);
}

#[tokio::test]
async fn test_expendable_balances_search() {
    let (app, _state) = setup_with_state(seeded_store().await).await;

    let (_, json) = get(app.clone(), "/reports/expendable-balances?search=os-001").await;
    assert_eq!(json["count"], 1);

    let (_, json) = get(app.clone(), "/reports/expendable-balances?search=BALL").await;
    assert_eq!(json["count"], 1);

    let (_, json) = get(app, "/reports/expendable-balances?search=laptop").await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["rows"], serde_json::json!([]));
}

#[tokio::test]
async fn test_balances_follow_new_records() {
    let store = seeded_store().await;
    let (app, state) = setup_with_state(store.clone()).await;

    store
        .put_record(
            &IssuanceEvent::new("RIS2", IssuanceStatus::Posted)
                .with_line(IssuanceLineItem::new("I1", 999)),
        )
        .await
        .unwrap();

    let mut receiver = state.balances.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        receiver.wait_for(|s| s.rows.first().is_some_and(|row| row.total_issued == 1029)),
    )
    .await
    .expect("balances never updated")
    .unwrap();

    let (_, json) = get(app, "/reports/expendable-balances").await;
    assert_eq!(json["rows"][0]["balance"], -929);
    assert_eq!(json["rows"][0]["over_issued"], true);
}

#[tokio::test]
async fn test_failed_source_returns_unavailable() {
    let store = FailingStore {
        inner: seeded_store().await,
        failing: Collection::IssueSlips,
    };
    let (app, _state) = setup_with_state(store).await;

    let (status, json) = get(app.clone(), "/reports/expendable-balances").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());

    let (status, json) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reports"], "degraded");
}

#[tokio::test]
async fn test_stock_card() {
    let app = setup().await;

    let (status, json) = get(app, "/reports/stock-cards/I1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item_id"], "I1");
    assert_eq!(json["balance"], 70);

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "receipt");
    assert_eq!(entries[0]["reference"], "IAR-2026-0001");
    assert_eq!(entries[0]["balance"], 100);
    assert_eq!(entries[1]["kind"], "issue");
    assert_eq!(entries[1]["office"], "Accounting");
    assert_eq!(entries[1]["balance"], 70);
}

#[tokio::test]
async fn test_stock_card_not_found() {
    let app = setup().await;

    let (status, json) = get(app.clone(), "/reports/stock-cards/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());

    // Non-expendable items have no stock card.
    let (status, _) = get(app, "/reports/stock-cards/I3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_card_failed_source() {
    let store = FailingStore {
        inner: seeded_store().await,
        failing: Collection::Items,
    };
    let (app, _state) = setup_with_state(store).await;

    let (status, _) = get(app, "/reports/stock-cards/I1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_allocate_document_numbers() {
    let app = setup().await;
    let year = Utc::now().year();

    let (status, json) = post(app.clone(), "/document-numbers/ris").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["number"], format!("RIS-{year}-0001"));
    assert_eq!(json["kind"], "ris");
    assert_eq!(json["year"], year);
    assert_eq!(json["sequence"], 1);

    let (_, json) = post(app.clone(), "/document-numbers/RIS").await;
    assert_eq!(json["number"], format!("RIS-{year}-0002"));

    // Each kind counts separately.
    let (_, json) = post(app, "/document-numbers/ppe").await;
    assert_eq!(json["number"], format!("PPE-{year}-0001"));
}

#[tokio::test]
async fn test_allocate_unknown_kind() {
    let app = setup().await;

    let (status, json) = post(app, "/document-numbers/invoice").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unknown document kind: invoice");
}

#[tokio::test]
async fn test_balances_stream_sends_current_state() {
    let app = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/expendable-balances/stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    let mut frames = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .expect("no event received")
        .expect("stream ended")
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();

    assert!(text.starts_with("event: balances"));
    assert!(text.contains("\"balance\":70"));
}
