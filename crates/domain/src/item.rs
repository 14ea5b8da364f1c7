//! Catalog items.

use common::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;
use crate::serde_ext::null_as_default;

/// Identifier of a catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the item ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<RecordId> for ItemId {
    fn from(id: RecordId) -> Self {
        Self(id.into_inner())
    }
}

impl From<&ItemId> for RecordId {
    fn from(id: &ItemId) -> Self {
        RecordId::new(id.as_str())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Property category of a catalog item.
///
/// Only expendable items are tracked by running balance; semi-expendable
/// and capital outlay items are tracked as individual property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Expendable,
    #[serde(rename = "Semi-Expendable")]
    SemiExpendable,
    #[serde(rename = "Capital Outlay")]
    CapitalOutlay,
}

impl Category {
    /// Returns the label used in stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Expendable => "Expendable",
            Category::SemiExpendable => "Semi-Expendable",
            Category::CapitalOutlay => "Capital Outlay",
        }
    }

    /// Returns true for consumables tracked by running balance.
    pub fn is_expendable(&self) -> bool {
        matches!(self, Category::Expendable)
    }

    /// Parses a category label, ignoring case and separator differences.
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "expendable" => Ok(Category::Expendable),
            "semiexpendable" => Ok(Category::SemiExpendable),
            "capitaloutlay" => Ok(Category::CapitalOutlay),
            _ => Err(DomainError::UnknownCategory(label.to_string())),
        }
    }

    /// Decodes an optional category, mapping missing, `null` and
    /// unrecognised labels to `None`.
    pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|label| Category::parse(&label).ok()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock_no: String,
    /// Unit of measure (e.g. "piece", "ream").
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(default, deserialize_with = "Category::deserialize_lenient")]
    pub category: Option<Category>,
}

impl Item {
    /// Creates a catalog item with no unit of measure.
    pub fn new(
        id: impl Into<ItemId>,
        description: impl Into<String>,
        stock_no: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            stock_no: stock_no.into(),
            unit: String::new(),
            category: Some(category),
        }
    }

    /// Sets the unit of measure.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Returns true if the catalog classifies this item as expendable.
    pub fn is_expendable(&self) -> bool {
        self.category.is_some_and(|c| c.is_expendable())
    }
}
