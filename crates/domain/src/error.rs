//! Domain error types.

use thiserror::Error;

/// Errors raised while interpreting domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The document kind is not one the office numbers.
    #[error("Unknown document kind: {0}")]
    UnknownDocumentKind(String),

    /// The category label is not recognised.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}
