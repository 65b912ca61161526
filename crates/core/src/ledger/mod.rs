//! Append-only per-group record of financial facts.
//!
//! The ledger is the sole source of truth: every derived view (net
//! balances, settlement suggestions) is a pure function of a group's
//! entry sequence. This module provides:
//! - Ledger entries (expenses and settlements)
//! - Input types for recording new entries
//! - Business rule validation
//! - Error types for ledger operations
//! - The in-memory ledger store with per-group exclusive sections

pub mod entry;
pub mod error;
pub mod store;
pub mod types;
pub mod validation;

pub use entry::{Expense, LedgerEntry, Settlement};
pub use error::LedgerError;
pub use store::LedgerStore;
pub use types::{ExpenseInput, SettlementInput};
