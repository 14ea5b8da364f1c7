//! Sequential numbering for issued documents.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A kind of document numbered from a yearly counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Requisition and issue slip.
    RequisitionIssueSlip,
    /// Property, plant and equipment number.
    PropertyNumber,
}

impl DocumentKind {
    /// Returns the prefix printed on the document.
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::RequisitionIssueSlip => "RIS",
            DocumentKind::PropertyNumber => "PPE",
        }
    }

    /// Returns the key under which the counter is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::RequisitionIssueSlip => "ris",
            DocumentKind::PropertyNumber => "ppe",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ris" => Ok(DocumentKind::RequisitionIssueSlip),
            "ppe" => Ok(DocumentKind::PropertyNumber),
            _ => Err(DomainError::UnknownDocumentKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A document number allocated from a per-kind, per-year counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub kind: DocumentKind,
    pub year: i32,
    /// 1-based position within the year.
    pub sequence: u64,
}

impl DocumentNumber {
    pub fn new(kind: DocumentKind, year: i32, sequence: u64) -> Self {
        Self {
            kind,
            year,
            sequence,
        }
    }
}

impl std::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{:04}",
            self.kind.prefix(),
            self.year,
            self.sequence
        )
    }
}
