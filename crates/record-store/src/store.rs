use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{Collection, Document, Record, RecordId, Result};

/// Capacity of the change notification channel of each store.
pub const CHANGE_FEED_CAPACITY: usize = 64;

/// Core trait for record store implementations.
///
/// A record store keeps the current version of each document per
/// collection and notifies subscribers whenever a collection changes.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts or replaces a document.
    async fn put(&self, document: Document) -> Result<()>;

    /// Retrieves a single document.
    ///
    /// Returns None if the document doesn't exist.
    async fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<Document>>;

    /// Deletes a document. Returns true if it existed.
    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<bool>;

    /// Retrieves the full current contents of a collection.
    ///
    /// Documents are returned in id order.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Subscribes to change notifications.
    ///
    /// Each message names a collection that changed since the last one;
    /// subscribers are expected to re-read it.
    fn subscribe(&self) -> broadcast::Receiver<Collection>;
}

/// Extension trait providing typed access to record stores.
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    /// Stores a typed record in its collection.
    async fn put_record<T: Record>(&self, record: &T) -> Result<()> {
        self.put(Document::from_record(record)?).await
    }

    /// Loads a typed record by id.
    async fn get_record<T: Record>(&self, id: &RecordId) -> Result<Option<T>> {
        match self.get(T::COLLECTION, id).await? {
            Some(document) => Ok(Some(document.decode()?)),
            None => Ok(None),
        }
    }

    /// Loads every record of a collection.
    ///
    /// Documents that cannot be decoded are skipped and counted; one
    /// malformed document never hides the rest of the collection.
    async fn list_records<T: Record>(&self) -> Result<Vec<T>> {
        let documents = self.list(T::COLLECTION).await?;
        let mut records = Vec::with_capacity(documents.len());

        for document in &documents {
            match document.decode::<T>() {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        collection = %T::COLLECTION,
                        id = %document.id,
                        error = %e,
                        "skipping undecodable document"
                    );
                    metrics::counter!(
                        "record_store_decode_failures",
                        "collection" => T::COLLECTION.as_str()
                    )
                    .increment(1);
                }
            }
        }

        Ok(records)
    }
}

// Blanket implementation for all RecordStore implementations
impl<T: RecordStore + ?Sized> RecordStoreExt for T {}
