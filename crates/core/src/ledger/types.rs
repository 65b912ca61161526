//! Input types for recording ledger entries.
//!
//! These are the validated-at-the-boundary shapes that reach the store;
//! the HTTP layer deserializes requests into them before any mutation.

use std::collections::BTreeSet;

use splitledger_shared::types::{Amount, UserId};

/// Input for recording a shared expense.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    /// The member who paid.
    pub payer: UserId,
    /// Amount paid in minor units (must be positive).
    pub amount: Amount,
    /// What the expense was for.
    pub description: String,
    /// The members to split between (must be a non-empty subset of members).
    pub split_between: BTreeSet<UserId>,
}

/// Input for recording a settlement payment.
#[derive(Debug, Clone)]
pub struct SettlementInput {
    /// The member who paid.
    pub payer: UserId,
    /// The member who was paid.
    pub payee: UserId,
    /// Amount transferred in minor units (must be positive).
    pub amount: Amount,
}
