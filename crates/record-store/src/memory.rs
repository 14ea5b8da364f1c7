use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use domain::DocumentKind;
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::{
    Collection, Document, RecordId, Result,
    counter::DocumentCounter,
    store::{CHANGE_FEED_CAPACITY, RecordStore},
};

/// In-memory record store implementation for testing.
///
/// This implementation keeps all documents in memory and provides
/// the same interface as the PostgreSQL implementation, including
/// change notifications on every write.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    documents: Arc<RwLock<HashMap<Collection, BTreeMap<RecordId, Document>>>>,
    counters: Arc<Mutex<HashMap<(DocumentKind, i32), u64>>>,
    changes: broadcast::Sender<Collection>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory record store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(Mutex::new(HashMap::new())),
            changes,
        }
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: Collection) -> usize {
        self.documents
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    /// Returns the number of live change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn notify(&self, collection: Collection) {
        // No subscribers is not an error.
        let _ = self.changes.send(collection);
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn put(&self, document: Document) -> Result<()> {
        let collection = document.collection;
        self.documents
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(document.id.clone(), document);
        self.notify(collection);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&collection).and_then(|c| c.get(id)).cloned())
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<bool> {
        let removed = self
            .documents
            .write()
            .await
            .get_mut(&collection)
            .and_then(|c| c.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        Ok(removed)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl DocumentCounter for InMemoryRecordStore {
    async fn next_value(&self, kind: DocumentKind, year: i32) -> Result<u64> {
        let mut counters = self.counters.lock().await;
        let value = counters.entry((kind, year)).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}
