use thiserror::Error;

use crate::{Collection, RecordId};

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document does not match the record shape of its collection.
    #[error("Failed to decode {collection} document {id}: {source}")]
    Decode {
        collection: Collection,
        id: RecordId,
        #[source]
        source: serde_json::Error,
    },

    /// A collection name read back from storage is not known.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, RecordStoreError>;
