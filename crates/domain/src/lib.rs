//! Domain records for the supply ledger.
//!
//! This crate holds the immutable records the ledger reads:
//! - [`Item`] catalog entries with their [`Category`]
//! - [`AcceptanceEvent`] inspection/acceptance reports (receipts)
//! - [`IssuanceEvent`] requisition/issue slips (issues)
//! - [`DocumentNumber`] sequential numbering for issued documents

pub mod acceptance;
pub mod document_number;
pub mod error;
pub mod issuance;
pub mod item;
mod serde_ext;

pub use acceptance::{AcceptanceEvent, AcceptanceLineItem, AcceptanceStatus};
pub use document_number::{DocumentKind, DocumentNumber};
pub use error::DomainError;
pub use issuance::{IssuanceEvent, IssuanceLineItem, IssuanceStatus};
pub use item::{Category, Item, ItemId};
