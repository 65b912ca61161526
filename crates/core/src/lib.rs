//! Core business logic for SplitLedger.
//!
//! This crate contains pure business logic with ZERO web dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `group` - Expense-sharing groups and membership
//! - `ledger` - Append-only per-group record of financial facts
//! - `balance` - Net-balance computation from a group's ledger
//! - `simplify` - Greedy debt simplification into pairwise settlements

pub mod balance;
pub mod group;
pub mod ledger;
pub mod simplify;
