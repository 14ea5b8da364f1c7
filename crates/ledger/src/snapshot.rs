//! The three source collections, as read together.

use domain::{AcceptanceEvent, IssuanceEvent, Item};
use record_store::{SourceError, SourceState};

use crate::{LedgerError, Result};

/// Complete contents of all three sources.
///
/// Only built once every source has loaded without error, so a report
/// never sees a partial view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    pub items: Vec<Item>,
    pub acceptances: Vec<AcceptanceEvent>,
    pub issuances: Vec<IssuanceEvent>,
}

impl LedgerSnapshot {
    pub fn new(
        items: Vec<Item>,
        acceptances: Vec<AcceptanceEvent>,
        issuances: Vec<IssuanceEvent>,
    ) -> Self {
        Self {
            items,
            acceptances,
            issuances,
        }
    }
}

/// The per-source states the ledger is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSources {
    pub items: SourceState<Item>,
    pub acceptances: SourceState<AcceptanceEvent>,
    pub issuances: SourceState<IssuanceEvent>,
}

impl LedgerSources {
    /// All three sources still waiting for their first read.
    pub fn loading() -> Self {
        Self {
            items: SourceState::loading(),
            acceptances: SourceState::loading(),
            issuances: SourceState::loading(),
        }
    }

    /// Returns true while any source has not completed a read.
    pub fn is_loading(&self) -> bool {
        self.items.loading || self.acceptances.loading || self.issuances.loading
    }

    /// Returns the first source failure, checking items, then acceptances,
    /// then issuances.
    pub fn error(&self) -> Option<&SourceError> {
        self.items
            .error
            .as_ref()
            .or(self.acceptances.error.as_ref())
            .or(self.issuances.error.as_ref())
    }

    /// Assembles a snapshot if every source is usable.
    ///
    /// Returns `Ok(None)` while loading and an error if any source failed.
    pub fn snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        if let Some(error) = self.error() {
            return Err(LedgerError::SourceUnavailable(error.clone()));
        }
        if self.is_loading() {
            return Ok(None);
        }
        Ok(Some(LedgerSnapshot::new(
            self.items.records.clone(),
            self.acceptances.records.clone(),
            self.issuances.records.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Category;
    use record_store::Collection;

    fn unavailable(collection: Collection) -> SourceError {
        SourceError {
            collection,
            message: "timed out".to_string(),
        }
    }

    fn loaded() -> LedgerSources {
        LedgerSources {
            items: SourceState::loaded(vec![Item::new(
                "I1",
                "Ballpen",
                "A1",
                Category::Expendable,
            )]),
            acceptances: SourceState::loaded(Vec::new()),
            issuances: SourceState::loaded(Vec::new()),
        }
    }

    #[test]
    fn loading_until_every_source_has_read() {
        let mut sources = LedgerSources::loading();
        assert!(sources.is_loading());
        assert_eq!(sources.snapshot().unwrap(), None);

        sources.items = SourceState::loaded(Vec::new());
        sources.acceptances = SourceState::loaded(Vec::new());
        assert!(sources.is_loading());

        sources.issuances = SourceState::loaded(Vec::new());
        assert!(!sources.is_loading());
        assert!(sources.snapshot().unwrap().is_some());
    }

    #[test]
    fn any_failure_withholds_the_snapshot() {
        let mut sources = loaded();
        sources.issuances = SourceState::failed(unavailable(Collection::IssueSlips));

        let err = sources.snapshot().unwrap_err();
        assert_eq!(
            err,
            LedgerError::SourceUnavailable(unavailable(Collection::IssueSlips))
        );
    }

    #[test]
    fn first_failure_is_reported() {
        let mut sources = loaded();
        sources.acceptances = SourceState::failed(unavailable(Collection::AcceptanceReports));
        sources.issuances = SourceState::failed(unavailable(Collection::IssueSlips));

        assert_eq!(
            sources.error().unwrap().collection,
            Collection::AcceptanceReports
        );
    }

    #[test]
    fn failure_wins_over_loading() {
        let mut sources = LedgerSources::loading();
        sources.items = SourceState::failed(unavailable(Collection::Items));

        assert!(sources.is_loading());
        assert!(sources.snapshot().is_err());
    }

    #[test]
    fn snapshot_carries_loaded_records() {
        let snapshot = loaded().snapshot().unwrap().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert!(snapshot.acceptances.is_empty());
    }
}
