//! Requisition and issue slips (issues out of stock).

use chrono::{DateTime, Utc};
use common::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::item::ItemId;
use crate::serde_ext::{lenient_quantity, null_as_default, skip_invalid};

/// Lifecycle status of a requisition and issue slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum IssuanceStatus {
    /// Issued and recorded against stock.
    Posted,

    /// Requested, not yet released.
    #[default]
    Pending,

    /// Voided; never counted.
    Cancelled,
}

impl IssuanceStatus {
    /// Returns true if the slip's quantities count as issued.
    pub fn is_effective(&self) -> bool {
        matches!(self, IssuanceStatus::Posted)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceStatus::Posted => "Posted",
            IssuanceStatus::Pending => "Pending",
            IssuanceStatus::Cancelled => "Cancelled",
        }
    }

    fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "posted" => Some(IssuanceStatus::Posted),
            "pending" => Some(IssuanceStatus::Pending),
            "cancelled" | "canceled" => Some(IssuanceStatus::Cancelled),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for IssuanceStatus {
    /// Unrecognised or missing labels decode as `Pending`, which never counts.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Self::parse).unwrap_or_default())
    }
}

impl std::fmt::Display for IssuanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One issued line of a slip. Slips carry no category; the catalog does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceLineItem {
    /// Empty when the line names no item; such lines match nothing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_id: ItemId,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,
}

impl IssuanceLineItem {
    pub fn new(item_id: impl Into<ItemId>, quantity: i64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// A requisition and issue slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceEvent {
    pub id: RecordId,
    /// Slip number, e.g. "RIS-2026-0042".
    #[serde(default, deserialize_with = "null_as_default")]
    pub ris_no: String,
    /// Requesting office.
    #[serde(default, deserialize_with = "null_as_default")]
    pub office: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: IssuanceStatus,
    #[serde(default, deserialize_with = "skip_invalid")]
    pub line_items: Vec<IssuanceLineItem>,
}

impl IssuanceEvent {
    /// Creates an undated slip with no lines.
    pub fn new(id: impl Into<RecordId>, status: IssuanceStatus) -> Self {
        Self {
            id: id.into(),
            ris_no: String::new(),
            office: String::new(),
            date: None,
            status,
            line_items: Vec::new(),
        }
    }

    /// Sets the slip number.
    pub fn with_number(mut self, ris_no: impl Into<String>) -> Self {
        self.ris_no = ris_no.into();
        self
    }

    /// Sets the requesting office.
    pub fn with_office(mut self, office: impl Into<String>) -> Self {
        self.office = office.into();
        self
    }

    /// Sets the slip date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Appends a line.
    pub fn with_line(mut self, line: IssuanceLineItem) -> Self {
        self.line_items.push(line);
        self
    }

    /// Returns true if the slip counts toward issued quantities.
    pub fn is_effective(&self) -> bool {
        self.status.is_effective()
    }
}
