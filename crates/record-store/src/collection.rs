use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RecordStoreError;

/// The document collections the ledger reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// The item catalog.
    Items,
    /// Inspection and acceptance reports.
    AcceptanceReports,
    /// Requisition and issue slips.
    IssueSlips,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Items,
        Collection::AcceptanceReports,
        Collection::IssueSlips,
    ];

    /// Returns the storage name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Items => "items",
            Collection::AcceptanceReports => "inspection_acceptance_reports",
            Collection::IssueSlips => "requisition_issue_slips",
        }
    }
}

impl FromStr for Collection {
    type Err = RecordStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RecordStoreError::UnknownCollection(s.to_string()))
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
