//! Live collections: a source adapter that re-reads on every change.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{Collection, Record, RecordStore, SourceState, read_source};

/// Delay before re-reading a collection whose last read failed.
pub const READ_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Upper bound of the retry delay, which doubles after each failed read.
pub const MAX_READ_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Owns a spawned task and aborts it when dropped.
#[derive(Debug)]
pub struct TaskGuard(JoinHandle<()>);

impl TaskGuard {
    /// Spawns a future on the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A collection kept current by a background task.
///
/// The published state starts as loading, becomes the first read's result,
/// and is replaced after every change notification for the collection. A
/// failed read is retried with a growing delay until one succeeds, so the
/// collection recovers without waiting for a write. Dropping the live
/// collection abandons any read in flight.
pub struct LiveCollection<T> {
    receiver: watch::Receiver<SourceState<T>>,
    _task: TaskGuard,
}

impl<T: Record> LiveCollection<T> {
    /// Starts following `T`'s collection in `store`.
    pub fn spawn<S>(store: S) -> Self
    where
        S: RecordStore + 'static,
    {
        let (sender, receiver) = watch::channel(SourceState::loading());
        // Subscribe before the first read so no change can slip between them.
        let mut changes = store.subscribe();

        let task = TaskGuard::spawn(async move {
            let mut retry_delay = READ_RETRY_DELAY;
            loop {
                let state = read_source::<T, S>(&store).await;
                let failed = state.error.is_some();
                if sender.send(state).is_err() {
                    return;
                }

                let running = if failed {
                    let running = tokio::select! {
                        running = wait_for_change(&mut changes, T::COLLECTION) => running,
                        () = tokio::time::sleep(retry_delay) => {
                            tracing::debug!(
                                collection = %T::COLLECTION,
                                delay_ms = retry_delay.as_millis() as u64,
                                "retrying failed read"
                            );
                            true
                        }
                    };
                    retry_delay = (retry_delay * 2).min(MAX_READ_RETRY_DELAY);
                    running
                } else {
                    retry_delay = READ_RETRY_DELAY;
                    wait_for_change(&mut changes, T::COLLECTION).await
                };

                if !running {
                    tracing::debug!(collection = %T::COLLECTION, "change feed closed");
                    return;
                }
            }
        });

        Self {
            receiver,
            _task: task,
        }
    }

    /// Returns the latest state and marks it as seen.
    pub fn latest(&mut self) -> SourceState<T> {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for a state newer than the last one seen.
    ///
    /// Returns false if the publishing task has stopped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

/// Waits until `collection` is reported changed.
///
/// A lagged receiver has lost notifications, so it counts as a change.
/// Returns false when the feed is closed.
async fn wait_for_change(
    changes: &mut broadcast::Receiver<Collection>,
    collection: Collection,
) -> bool {
    loop {
        match changes.recv().await {
            Ok(changed) if changed == collection => return true,
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(%collection, skipped, "change feed lagged, re-reading");
                return true;
            }
            Err(RecvError::Closed) => return false,
        }
    }
}
