pub mod collection;
pub mod counter;
pub mod document;
pub mod error;
pub mod live;
pub mod memory;
pub mod postgres;
pub mod source;
pub mod store;
pub mod timestamp;

pub use collection::Collection;
pub use common::RecordId;
pub use counter::{DocumentCounter, DocumentCounterExt};
pub use document::{Document, Record};
pub use error::{RecordStoreError, Result};
pub use live::{LiveCollection, TaskGuard};
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use source::{SourceError, SourceState, read_source};
pub use store::{RecordStore, RecordStoreExt};
