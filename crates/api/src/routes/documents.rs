//! Document number allocation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use domain::{DocumentKind, DocumentNumber};
use record_store::DocumentCounterExt;
use serde::Serialize;

use crate::SupplyStore;
use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct DocumentNumberResponse {
    pub number: String,
    pub kind: &'static str,
    pub year: i32,
    pub sequence: u64,
}

impl From<DocumentNumber> for DocumentNumberResponse {
    fn from(number: DocumentNumber) -> Self {
        Self {
            number: number.to_string(),
            kind: number.kind.as_str(),
            year: number.year,
            sequence: number.sequence,
        }
    }
}

/// POST /document-numbers/{kind}: allocate the next number for this year.
#[tracing::instrument(skip(state))]
pub async fn allocate<S: SupplyStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(kind): Path<String>,
) -> Result<(StatusCode, Json<DocumentNumberResponse>), ApiError> {
    let kind: DocumentKind = kind.parse()?;
    let number = state.store.next_number(kind, Utc::now().year()).await?;

    metrics::counter!("document_numbers_allocated_total", "kind" => kind.as_str()).increment(1);

    Ok((StatusCode::CREATED, Json(number.into())))
}
