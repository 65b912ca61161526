//! Business rule validation for ledger operations.
//!
//! All checks run before anything is appended, so a failed append leaves
//! the ledger exactly as it was.

use splitledger_shared::types::Amount;

use crate::group::Group;

use super::error::LedgerError;
use super::types::{ExpenseInput, SettlementInput};

/// Maximum amount recordable in a single entry, in minor units.
///
/// One trillion minor units (ten billion in major units). The cap keeps
/// balance sums comfortably inside `i64` for any realistic entry count,
/// so replaying a ledger never overflows.
pub const MAX_ENTRY_AMOUNT: Amount = Amount::new(1_000_000_000_000);

/// Validates a group name.
///
/// # Errors
///
/// Returns `EmptyName` if the name is empty or whitespace-only.
pub fn validate_group_name(name: &str) -> Result<(), LedgerError> {
    if name.trim().is_empty() {
        return Err(LedgerError::EmptyName);
    }
    Ok(())
}

/// Validates an expense against the group it is recorded in.
///
/// # Errors
///
/// Returns an error if the amount is not positive or exceeds
/// [`MAX_ENTRY_AMOUNT`], the participant set is empty, the payer is not a
/// member, or any participant is not a member.
pub fn validate_expense(group: &Group, input: &ExpenseInput) -> Result<(), LedgerError> {
    validate_amount(input.amount)?;

    if input.split_between.is_empty() {
        return Err(LedgerError::EmptyParticipants);
    }

    if !group.is_member(input.payer) {
        return Err(LedgerError::NotAMember(input.payer));
    }

    for participant in &input.split_between {
        if !group.is_member(*participant) {
            return Err(LedgerError::NotAMember(*participant));
        }
    }

    Ok(())
}

/// Validates a settlement against the group it is recorded in.
///
/// A settlement is an unconstrained transfer: the payer may pay more than
/// they owe, flipping the sign of their balance.
///
/// # Errors
///
/// Returns an error if the amount is not positive or exceeds
/// [`MAX_ENTRY_AMOUNT`], the payer and payee are the same user, or either
/// party is not a member.
pub fn validate_settlement(group: &Group, input: &SettlementInput) -> Result<(), LedgerError> {
    validate_amount(input.amount)?;

    if input.payer == input.payee {
        return Err(LedgerError::SelfSettlement);
    }

    if !group.is_member(input.payer) {
        return Err(LedgerError::NotAMember(input.payer));
    }

    if !group.is_member(input.payee) {
        return Err(LedgerError::NotAMember(input.payee));
    }

    Ok(())
}

fn validate_amount(amount: Amount) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount(amount));
    }

    if amount > MAX_ENTRY_AMOUNT {
        return Err(LedgerError::AmountTooLarge(amount));
    }

    Ok(())
}
