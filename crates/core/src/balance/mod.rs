//! Net-balance computation from a group's ledger.
//!
//! Replaying a group's entry sequence yields one signed amount per member:
//! positive means the member is owed money overall, negative means they owe.
//! The values always sum to exactly zero (conservation of money) - the
//! single most important correctness property of the system. Integer
//! minor units make the invariant exact, not approximate.

use std::collections::{BTreeMap, BTreeSet};

use splitledger_shared::types::{Amount, UserId};

use crate::group::Group;
use crate::ledger::entry::LedgerEntry;

#[cfg(test)]
mod props;

/// Signed net balance per member, for one group.
pub type NetBalance = BTreeMap<UserId, Amount>;

/// Splits an amount evenly across participants, in minor units.
///
/// Integer division leaves a remainder of `amount % count` minor units;
/// those are handed out one unit at a time to participants in ascending
/// `UserId` order, so the shares always reconstruct the amount exactly.
/// The order is fixed so repeated computation is deterministic.
#[must_use]
pub fn split_amount(amount: Amount, participants: &BTreeSet<UserId>) -> Vec<(UserId, Amount)> {
    debug_assert!(!participants.is_empty(), "participants must be non-empty");
    debug_assert!(amount.is_positive(), "amount must be positive");

    let count = i64::try_from(participants.len()).unwrap_or(i64::MAX);
    let share = amount.minor_units() / count;
    let remainder = usize::try_from(amount.minor_units() % count).unwrap_or(0);

    // BTreeSet iterates in ascending UserId order.
    participants
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let extra = i64::from(i < remainder);
            (*user, Amount::new(share + extra))
        })
        .collect()
}

/// Replays a group's ledger into a net-balance map.
///
/// Every member starts at zero, including members with no entries yet.
/// For each expense, the payer is credited the full amount and each
/// participant is debited their share. For each settlement, the payer is
/// credited (they extinguished debt by paying) and the payee is debited
/// (their receivable was extinguished by being paid).
///
/// Pure and deterministic: two calls over the same entry sequence yield
/// identical maps.
#[must_use]
pub fn compute(group: &Group, entries: &[LedgerEntry]) -> NetBalance {
    let mut balances: NetBalance = group
        .members
        .iter()
        .map(|user| (*user, Amount::ZERO))
        .collect();

    for entry in entries {
        match entry {
            LedgerEntry::Expense(expense) => {
                *balances.entry(expense.payer).or_insert(Amount::ZERO) += expense.amount;

                for (participant, share) in split_amount(expense.amount, &expense.split_between) {
                    *balances.entry(participant).or_insert(Amount::ZERO) -= share;
                }
            }
            LedgerEntry::Settlement(settlement) => {
                *balances.entry(settlement.payer).or_insert(Amount::ZERO) += settlement.amount;
                *balances.entry(settlement.payee).or_insert(Amount::ZERO) -= settlement.amount;
            }
        }
    }

    balances
}

/// Returns true if the balance map sums to exactly zero.
#[must_use]
pub fn is_zero_sum(balances: &NetBalance) -> bool {
    balances.values().copied().sum::<Amount>().is_zero()
}
