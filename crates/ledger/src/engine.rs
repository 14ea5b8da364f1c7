//! Reads the sources and evaluates reports, once or continuously.

use std::time::{Duration, Instant};

use domain::{AcceptanceEvent, IssuanceEvent, Item, ItemId};
use record_store::{LiveCollection, RecordStore, TaskGuard, read_source};
use tokio::sync::watch;

use crate::{
    BalanceRow, ExpendableBalances, LedgerSources, Report, ReportState, Result, StockCard,
};

/// Evaluates a report against the current source states.
///
/// Nothing is computed while a source is loading or after one failed;
/// the returned state carries the flags instead.
pub fn evaluate<R: Report>(report: &R, sources: &LedgerSources) -> ReportState<R::Row> {
    let loading = sources.is_loading();
    let snapshot = match sources.snapshot() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return ReportState::loading(),
        Err(error) => {
            return ReportState {
                rows: Vec::new(),
                loading,
                error: Some(error),
            };
        }
    };

    let started = Instant::now();
    let rows = report.compute(&snapshot);
    metrics::histogram!("ledger_report_compute_seconds", "report" => report.name())
        .record(started.elapsed().as_secs_f64());
    metrics::counter!("ledger_report_recomputations_total", "report" => report.name())
        .increment(1);
    tracing::debug!(report = report.name(), rows = rows.len(), "report computed");

    ReportState::ready(rows)
}

/// Entry point for ledger reports over a record store.
#[derive(Clone)]
pub struct LedgerEngine<S> {
    store: S,
}

impl<S> LedgerEngine<S>
where
    S: RecordStore + Clone + 'static,
{
    /// Creates a new engine reading from the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads all three sources concurrently.
    #[tracing::instrument(skip(self))]
    pub async fn snapshot(&self) -> LedgerSources {
        let (items, acceptances, issuances) = tokio::join!(
            read_source::<Item, S>(&self.store),
            read_source::<AcceptanceEvent, S>(&self.store),
            read_source::<IssuanceEvent, S>(&self.store),
        );

        LedgerSources {
            items,
            acceptances,
            issuances,
        }
    }

    /// Reads the sources and evaluates one report.
    pub async fn compute<R: Report>(&self, report: &R) -> ReportState<R::Row> {
        let sources = self.snapshot().await;
        evaluate(report, &sources)
    }

    /// Computes the expendable balances, optionally filtered by a search term.
    #[tracing::instrument(skip(self))]
    pub async fn compute_expendable_balances(
        &self,
        search: Option<&str>,
    ) -> ReportState<BalanceRow> {
        let report = match search {
            Some(term) => ExpendableBalances::with_search(term),
            None => ExpendableBalances::new(),
        };
        self.compute(&report).await
    }

    /// Builds the stock card of one expendable item.
    #[tracing::instrument(skip(self, item_id), fields(item_id = %item_id))]
    pub async fn stock_card(&self, item_id: &ItemId) -> Result<StockCard> {
        let snapshot = self.snapshot().await.snapshot()?.unwrap_or_default();
        StockCard::build(&snapshot, item_id)
    }

    /// Keeps a report current as the sources change.
    ///
    /// Changes arriving within `debounce` of one another are folded into a
    /// single recomputation. Dropping the returned feed stops every reader.
    pub fn watch<R: Report>(&self, report: R, debounce: Duration) -> ReportFeed<R::Row> {
        let mut items = LiveCollection::<Item>::spawn(self.store.clone());
        let mut acceptances = LiveCollection::<AcceptanceEvent>::spawn(self.store.clone());
        let mut issuances = LiveCollection::<IssuanceEvent>::spawn(self.store.clone());

        let (sender, receiver) = watch::channel(ReportState::loading());

        let task = TaskGuard::spawn(async move {
            loop {
                let sources = LedgerSources {
                    items: items.latest(),
                    acceptances: acceptances.latest(),
                    issuances: issuances.latest(),
                };
                let state = evaluate(&report, &sources);
                sender.send_if_modified(|current| {
                    if *current == state {
                        false
                    } else {
                        *current = state;
                        true
                    }
                });

                let running = tokio::select! {
                    running = items.changed() => running,
                    running = acceptances.changed() => running,
                    running = issuances.changed() => running,
                    _ = sender.closed() => false,
                };
                if !running {
                    tracing::debug!(report = report.name(), "report feed stopped");
                    return;
                }
                if !debounce.is_zero() {
                    tokio::time::sleep(debounce).await;
                }
            }
        });

        ReportFeed {
            receiver,
            _task: task,
        }
    }
}

/// A continuously recomputed report.
///
/// Starts in the loading state. Dropping the feed cancels the reads and
/// recomputation behind it; outstanding subscriptions then stop updating.
pub struct ReportFeed<Row> {
    receiver: watch::Receiver<ReportState<Row>>,
    _task: TaskGuard,
}

impl<Row: Clone> ReportFeed<Row> {
    /// Returns a copy of the latest state.
    pub fn current(&self) -> ReportState<Row> {
        self.receiver.borrow().clone()
    }

    /// Returns a receiver notified on every new state.
    pub fn subscribe(&self) -> watch::Receiver<ReportState<Row>> {
        self.receiver.clone()
    }

    /// Waits until every source has loaded or failed.
    pub async fn ready(&self) -> ReportState<Row> {
        let mut receiver = self.receiver.clone();
        let ready = receiver
            .wait_for(|state| !state.loading)
            .await
            .map(|state| state.clone());
        ready.unwrap_or_else(|_| receiver.borrow().clone())
    }
}
