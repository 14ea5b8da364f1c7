use chrono::{DateTime, Utc};
use domain::{AcceptanceEvent, IssuanceEvent, Item};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Collection, RecordId, RecordStoreError, Result, timestamp};

/// A raw document as held by the store.
///
/// The body is schemaless JSON written by whichever workflow owns the
/// collection; typed access goes through [`Document::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The collection this document belongs to.
    pub collection: Collection,

    /// Unique identifier within the collection.
    pub id: RecordId,

    /// The document body as JSON.
    pub body: serde_json::Value,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document stamped with the current time.
    pub fn new(collection: Collection, id: RecordId, body: serde_json::Value) -> Self {
        Self {
            collection,
            id,
            body,
            updated_at: Utc::now(),
        }
    }

    /// Serializes a typed record into a document of its collection.
    pub fn from_record<T: Record>(record: &T) -> Result<Self> {
        Ok(Self::new(
            T::COLLECTION,
            record.record_id(),
            serde_json::to_value(record)?,
        ))
    }

    /// Decodes the body into a typed record.
    ///
    /// Timestamp wrappers are normalized first, and the store's document id
    /// replaces any `id` field inside the body.
    pub fn decode<T: Record>(&self) -> Result<T> {
        let mut body = self.body.clone();
        timestamp::normalize(&mut body);
        if let serde_json::Value::Object(map) = &mut body {
            map.insert(
                "id".to_string(),
                serde_json::Value::String(self.id.to_string()),
            );
        }

        serde_json::from_value(body).map_err(|source| RecordStoreError::Decode {
            collection: self.collection,
            id: self.id.clone(),
            source,
        })
    }
}

/// A typed record stored in a fixed collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection records of this type live in.
    const COLLECTION: Collection;

    /// Returns the document id of this record.
    fn record_id(&self) -> RecordId;
}

impl Record for Item {
    const COLLECTION: Collection = Collection::Items;

    fn record_id(&self) -> RecordId {
        RecordId::from(&self.id)
    }
}

impl Record for AcceptanceEvent {
    const COLLECTION: Collection = Collection::AcceptanceReports;

    fn record_id(&self) -> RecordId {
        self.id.clone()
    }
}

impl Record for IssuanceEvent {
    const COLLECTION: Collection = Collection::IssueSlips;

    fn record_id(&self) -> RecordId {
        self.id.clone()
    }
}
