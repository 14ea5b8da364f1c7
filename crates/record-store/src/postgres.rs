use std::time::Duration;

use async_trait::async_trait;
use domain::DocumentKind;
use sqlx::{
    PgPool, Row,
    postgres::{PgListener, PgPoolOptions, PgRow},
};
use tokio::sync::broadcast;

use crate::{
    Collection, Document, RecordId, Result, TaskGuard,
    counter::DocumentCounter,
    store::{CHANGE_FEED_CAPACITY, RecordStore},
};

/// Notification channel the records trigger publishes on.
pub const CHANGE_CHANNEL: &str = "record_changes";

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// PostgreSQL-backed record store implementation.
///
/// Writes are observed through `LISTEN/NOTIFY`: a trigger on the records
/// table publishes the collection name, and [`spawn_listener`] relays it
/// to subscribers. Writes from other processes are therefore seen too.
///
/// [`spawn_listener`]: PostgresRecordStore::spawn_listener
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
    changes: broadcast::Sender<Collection>,
}

impl PostgresRecordStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { pool, changes }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Starts relaying database change notifications to subscribers.
    ///
    /// The listener connection is established before this returns. If the
    /// connection drops, every collection is reported changed once it is
    /// re-established, since notifications sent meanwhile are lost.
    pub async fn spawn_listener(&self) -> Result<TaskGuard> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        tracing::info!(channel = CHANGE_CHANNEL, "listening for record changes");

        let changes = self.changes.clone();
        Ok(TaskGuard::spawn(async move {
            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => match notification.payload().parse::<Collection>() {
                        Ok(collection) => {
                            let _ = changes.send(collection);
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "ignoring notification");
                        }
                    },
                    Ok(None) => {
                        tracing::warn!("listener reconnected, refreshing all collections");
                        for collection in Collection::ALL {
                            let _ = changes.send(collection);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "listener error");
                        tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                    }
                }
            }
        }))
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        let collection: String = row.try_get("collection")?;

        Ok(Document {
            collection: collection.parse()?,
            id: RecordId::new(row.try_get::<String, _>("id")?),
            body: row.try_get("body")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn put(&self, document: Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, body, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (collection, id) DO UPDATE SET
                body = EXCLUDED.body,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(document.collection.as_str())
        .bind(document.id.as_str())
        .bind(&document.body)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, body, updated_at
            FROM records
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            r#"
            SELECT collection, id, body, updated_at
            FROM records
            WHERE collection = $1
            ORDER BY id ASC
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl DocumentCounter for PostgresRecordStore {
    async fn next_value(&self, kind: DocumentKind, year: i32) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO document_counters (kind, year, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (kind, year) DO UPDATE SET
                value = document_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(kind.as_str())
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(value.unsigned_abs())
    }
}
