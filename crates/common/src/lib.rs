//! Shared identifier types used across the supply ledger crates.

mod types;

pub use types::RecordId;
