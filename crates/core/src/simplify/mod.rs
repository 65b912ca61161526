//! Greedy debt simplification.
//!
//! Given a zero-sum net-balance map, emit a small set of pairwise
//! transactions that would zero every balance. Finding the provably
//! minimal set is NP-hard (the minimum cash flow problem), so this is a
//! deterministic greedy heuristic: repeatedly match the largest creditor
//! with the largest debtor. The output is bounded by
//! `nonzero_balances - 1` transactions, which is not always the true
//! minimum.
//!
//! Pure function of the balance map. It never appends to the ledger;
//! recording an actual settlement is a separate, explicit user action.

use serde::{Deserialize, Serialize};
use splitledger_shared::types::{Amount, UserId};

use crate::balance::{NetBalance, is_zero_sum};
use crate::ledger::error::LedgerError;

#[cfg(test)]
mod props;

/// A proposed (not yet recorded) settlement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    /// The member who should pay.
    pub from: UserId,
    /// The member who should be paid.
    pub to: UserId,
    /// The suggested amount, in minor units (always positive).
    pub amount: Amount,
}

/// One party's outstanding position while matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Party {
    user: UserId,
    /// Absolute outstanding amount, always positive.
    outstanding: Amount,
}

/// Descending by outstanding amount, ties broken by ascending user id,
/// so the matching order is fully deterministic.
fn sort_parties(parties: &mut [Party]) {
    parties.sort_by(|a, b| {
        b.outstanding
            .cmp(&a.outstanding)
            .then_with(|| a.user.cmp(&b.user))
    });
}

/// Produces an ordered list of suggestions that zero every balance.
///
/// # Errors
///
/// Returns `UnbalancedInput` if the map's values do not sum to zero.
/// That is a caller contract violation - the balance calculator
/// guarantees zero-sum maps - so it is an internal fault, not a
/// user-facing error.
pub fn simplify(balances: &NetBalance) -> Result<Vec<SettlementSuggestion>, LedgerError> {
    let sum: Amount = balances.values().copied().sum();
    if !is_zero_sum(balances) {
        return Err(LedgerError::UnbalancedInput(sum));
    }

    let mut creditors: Vec<Party> = Vec::new();
    let mut debtors: Vec<Party> = Vec::new();

    for (user, balance) in balances {
        if balance.is_positive() {
            creditors.push(Party {
                user: *user,
                outstanding: *balance,
            });
        } else if balance.is_negative() {
            debtors.push(Party {
                user: *user,
                outstanding: balance.abs(),
            });
        }
        // Members already at zero take no part.
    }

    let mut suggestions = Vec::new();

    while !creditors.is_empty() && !debtors.is_empty() {
        sort_parties(&mut creditors);
        sort_parties(&mut debtors);

        let creditor = &mut creditors[0];
        let debtor = &mut debtors[0];

        let transfer = creditor.outstanding.min(debtor.outstanding);
        suggestions.push(SettlementSuggestion {
            from: debtor.user,
            to: creditor.user,
            amount: transfer,
        });

        creditor.outstanding -= transfer;
        debtor.outstanding -= transfer;

        creditors.retain(|p| !p.outstanding.is_zero());
        debtors.retain(|p| !p.outstanding.is_zero());
    }

    // Zero-sum input guarantees both sides exhaust together.
    debug_assert!(creditors.is_empty() && debtors.is_empty());

    Ok(suggestions)
}
