//! Ledger entry domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use splitledger_shared::types::{Amount, ExpenseId, GroupId, SettlementId, UserId};

/// A shared expense paid by one member and split between participants.
///
/// Immutable once recorded. The payer may or may not be included in
/// `split_between`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier for this expense.
    pub id: ExpenseId,
    /// The group this expense belongs to.
    pub group_id: GroupId,
    /// The member who paid.
    pub payer: UserId,
    /// Amount paid, in minor currency units (always positive).
    pub amount: Amount,
    /// What the expense was for.
    pub description: String,
    /// The members the expense is split between (non-empty).
    pub split_between: BTreeSet<UserId>,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

/// A recorded real-world payment between two members.
///
/// Immutable once recorded. Represents a payment that actually happened,
/// not a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier for this settlement.
    pub id: SettlementId,
    /// The group this settlement belongs to.
    pub group_id: GroupId,
    /// The member who paid.
    pub payer: UserId,
    /// The member who was paid.
    pub payee: UserId,
    /// Amount transferred, in minor currency units (always positive).
    pub amount: Amount,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

/// A single entry in a group's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LedgerEntry {
    /// A shared expense.
    Expense(Expense),
    /// A recorded payment between two members.
    Settlement(Settlement),
}

impl LedgerEntry {
    /// Returns the group this entry belongs to.
    #[must_use]
    pub fn group_id(&self) -> GroupId {
        match self {
            Self::Expense(e) => e.group_id,
            Self::Settlement(s) => s.group_id,
        }
    }

    /// Returns the recording timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Expense(e) => e.created_at,
            Self::Settlement(s) => s.created_at,
        }
    }
}
