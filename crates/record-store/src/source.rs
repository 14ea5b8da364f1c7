//! Source adapter contract: a full collection snapshot plus loading/error flags.

use thiserror::Error;

use crate::{Collection, Record, RecordStore, RecordStoreExt};

/// A collection that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collection} unavailable: {message}")]
pub struct SourceError {
    pub collection: Collection,
    pub message: String,
}

/// The state of one source collection as seen by a consumer.
///
/// A failed read yields no records and an error; it is never surfaced as a
/// panic or an `Err` past the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceState<T> {
    pub records: Vec<T>,
    /// True until the first read has completed.
    pub loading: bool,
    pub error: Option<SourceError>,
}

impl<T> SourceState<T> {
    /// The state before any read has completed.
    pub fn loading() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// A successful read.
    pub fn loaded(records: Vec<T>) -> Self {
        Self {
            records,
            loading: false,
            error: None,
        }
    }

    /// A failed read.
    pub fn failed(error: SourceError) -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            error: Some(error),
        }
    }

    /// Returns true if the records can be used.
    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// Reads the full current snapshot of a record collection.
#[tracing::instrument(skip(store), fields(collection = %T::COLLECTION))]
pub async fn read_source<T, S>(store: &S) -> SourceState<T>
where
    T: Record,
    S: RecordStore + ?Sized,
{
    metrics::counter!("record_store_reads_total", "collection" => T::COLLECTION.as_str())
        .increment(1);

    match store.list_records::<T>().await {
        Ok(records) => {
            tracing::debug!(count = records.len(), "source read");
            SourceState::loaded(records)
        }
        Err(e) => {
            tracing::warn!(error = %e, "source read failed");
            SourceState::failed(SourceError {
                collection: T::COLLECTION,
                message: e.to_string(),
            })
        }
    }
}
