//! Report endpoints: expendable balances (snapshot and stream) and stock cards.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use domain::ItemId;
use futures_util::Stream;
use futures_util::stream;
use ledger::{BalanceRow, LedgerError, ReportState, StockCard, StockCardEntry, filter_rows};
use serde::{Deserialize, Serialize};

use crate::SupplyStore;
use crate::error::ApiError;
use crate::routes::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct BalancesQuery {
    pub search: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct BalanceRowResponse {
    pub item_id: String,
    pub description: String,
    pub stock_no: String,
    pub unit: String,
    pub total_received: i64,
    pub total_issued: i64,
    pub balance: i64,
    pub over_issued: bool,
}

impl From<BalanceRow> for BalanceRowResponse {
    fn from(row: BalanceRow) -> Self {
        Self {
            over_issued: row.is_over_issued(),
            item_id: row.item_id.to_string(),
            description: row.description,
            stock_no: row.stock_no,
            unit: row.unit,
            total_received: row.total_received,
            total_issued: row.total_issued,
            balance: row.balance,
        }
    }
}

#[derive(Serialize)]
pub struct BalancesResponse {
    pub loading: bool,
    pub count: usize,
    pub rows: Vec<BalanceRowResponse>,
}

impl BalancesResponse {
    /// Renders a report state, applying the search term to its rows.
    fn from_state(
        state: ReportState<BalanceRow>,
        search: Option<&str>,
    ) -> Result<Self, LedgerError> {
        if let Some(error) = state.error {
            return Err(error);
        }

        let rows: Vec<BalanceRowResponse> = filter_rows(state.rows, search)
            .into_iter()
            .map(BalanceRowResponse::from)
            .collect();

        Ok(Self {
            loading: state.loading,
            count: rows.len(),
            rows,
        })
    }
}

#[derive(Serialize)]
pub struct StockCardEntryResponse {
    pub date: Option<DateTime<Utc>>,
    pub kind: &'static str,
    pub reference: String,
    pub office: Option<String>,
    pub received: i64,
    pub issued: i64,
    pub balance: i64,
}

impl From<StockCardEntry> for StockCardEntryResponse {
    fn from(entry: StockCardEntry) -> Self {
        Self {
            date: entry.date,
            kind: entry.kind.as_str(),
            reference: entry.reference,
            office: entry.office,
            received: entry.received,
            issued: entry.issued,
            balance: entry.balance,
        }
    }
}

#[derive(Serialize)]
pub struct StockCardResponse {
    pub item_id: String,
    pub description: String,
    pub stock_no: String,
    pub unit: String,
    pub balance: i64,
    pub entries: Vec<StockCardEntryResponse>,
}

impl From<StockCard> for StockCardResponse {
    fn from(card: StockCard) -> Self {
        Self {
            balance: card.balance(),
            item_id: card.item_id.to_string(),
            description: card.description,
            stock_no: card.stock_no,
            unit: card.unit,
            entries: card.entries.into_iter().map(Into::into).collect(),
        }
    }
}

// -- Handlers --

/// GET /reports/expendable-balances: current balances, optionally searched.
///
/// While sources are still loading the response has `loading: true` and no
/// rows. A failed source yields 503.
#[tracing::instrument(skip(state))]
pub async fn balances<S: SupplyStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<BalancesQuery>,
) -> Result<Json<BalancesResponse>, ApiError> {
    let report = state.balances.current();
    let response = BalancesResponse::from_state(report, query.search.as_deref())?;
    Ok(Json(response))
}

/// GET /reports/expendable-balances/stream: one `balances` event per change.
///
/// The current state is sent immediately. A failed source is sent as an
/// `error` event and the stream stays open for recovery.
pub async fn balances_stream<S: SupplyStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<BalancesQuery>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let receiver = state.balances.subscribe();
    let search = query.search;

    let events = stream::unfold((receiver, true), move |(mut receiver, first)| {
        let search = search.clone();
        async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let report = receiver.borrow_and_update().clone();
            Some((balances_event(report, search.as_deref()), (receiver, false)))
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn balances_event(
    report: ReportState<BalanceRow>,
    search: Option<&str>,
) -> Result<Event, axum::Error> {
    match BalancesResponse::from_state(report, search) {
        Ok(body) => Event::default().event("balances").json_data(body),
        Err(err) => Event::default()
            .event("error")
            .json_data(serde_json::json!({ "error": err.to_string() })),
    }
}

/// GET /reports/stock-cards/{item_id}: movement history of one item.
#[tracing::instrument(skip(state))]
pub async fn stock_card<S: SupplyStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(item_id): Path<String>,
) -> Result<Json<StockCardResponse>, ApiError> {
    let card = state.engine.stock_card(&ItemId::new(item_id)).await?;
    Ok(Json(card.into()))
}
