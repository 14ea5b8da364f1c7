use async_trait::async_trait;
use domain::{DocumentKind, DocumentNumber};

use crate::Result;

/// Allocates sequential document numbers.
///
/// Each (kind, year) pair has its own counter starting at 1. Allocation is
/// an atomic read-modify-write: concurrent callers never receive the same
/// value.
#[async_trait]
pub trait DocumentCounter: Send + Sync {
    /// Increments the counter and returns the new value.
    async fn next_value(&self, kind: DocumentKind, year: i32) -> Result<u64>;
}

/// Extension trait providing formatted numbers.
#[async_trait]
pub trait DocumentCounterExt: DocumentCounter {
    /// Allocates the next document number for the year.
    async fn next_number(&self, kind: DocumentKind, year: i32) -> Result<DocumentNumber> {
        let sequence = self.next_value(kind, year).await?;
        tracing::info!(%kind, year, sequence, "document number allocated");
        Ok(DocumentNumber::new(kind, year, sequence))
    }
}

// Blanket implementation for all DocumentCounter implementations
impl<T: DocumentCounter + ?Sized> DocumentCounterExt for T {}
