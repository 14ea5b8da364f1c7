//! Ledger error types.

use domain::ItemId;
use record_store::SourceError;
use thiserror::Error;

/// Errors reported by ledger computations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// One of the source collections could not be read; nothing was computed.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// The item is not in the catalog or is not expendable.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
