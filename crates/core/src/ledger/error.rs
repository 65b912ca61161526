//! Ledger error types for validation, lookup, and invariant failures.

use splitledger_shared::AppError;
use splitledger_shared::types::{Amount, GroupId, UserId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Group name cannot be empty.
    #[error("Group name cannot be empty")]
    EmptyName,

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    /// Amount exceeds the per-entry maximum.
    #[error("Amount {0} exceeds the maximum recordable in a single entry")]
    AmountTooLarge(Amount),

    /// An expense must be split between at least one participant.
    #[error("Expense must be split between at least one participant")]
    EmptyParticipants,

    /// The referenced user is not a member of the group.
    #[error("User {0} is not a member of the group")]
    NotAMember(UserId),

    /// A settlement payer cannot pay themselves.
    #[error("Settlement payer and payee must be different")]
    SelfSettlement,

    /// The user is already a member of the group.
    #[error("User {0} is already a member of the group")]
    AlreadyMember(UserId),

    // ========== Lookup Errors ==========
    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    // ========== Concurrency Errors ==========
    /// The group's exclusive section could not be entered in time.
    #[error("Group {0} is contended, please retry")]
    Contended(GroupId),

    // ========== Invariant Violations ==========
    /// Computed balances do not sum to zero. This is a bug in the ledger
    /// or the balance calculator, never bad caller input.
    #[error("Balances for group {group_id} sum to {sum}, expected 0")]
    UnbalancedLedger {
        /// The group whose balances failed the check.
        group_id: GroupId,
        /// The offending sum.
        sum: Amount,
    },

    /// A balance map handed to the simplifier does not sum to zero.
    #[error("Balance map sums to {0}, expected 0")]
    UnbalancedInput(Amount),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_NAME",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
            Self::NotAMember(_) => "NOT_A_MEMBER",
            Self::SelfSettlement => "SELF_SETTLEMENT",
            Self::AlreadyMember(_) => "ALREADY_MEMBER",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::Contended(_) => "CONTENDED",
            Self::UnbalancedLedger { .. } | Self::UnbalancedInput(_) => "INVARIANT_VIOLATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyName
            | Self::NonPositiveAmount(_)
            | Self::AmountTooLarge(_)
            | Self::EmptyParticipants
            | Self::NotAMember(_)
            | Self::SelfSettlement => 400,

            // 404 Not Found
            Self::GroupNotFound(_) => 404,

            // 409 Conflict
            Self::AlreadyMember(_) | Self::Contended(_) => 409,

            // 500 Internal Server Error - internal faults
            Self::UnbalancedLedger { .. } | Self::UnbalancedInput(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Contended(_))
    }

    /// Returns true if this error indicates an internal fault rather than
    /// a bad request. Internal faults are alerting, never retried.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::UnbalancedLedger { .. } | Self::UnbalancedInput(_))
    }
}

/// Collapses ledger errors into the coarse application taxonomy used at
/// the outermost boundary. The fine-grained code is kept in the message.
impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::EmptyName
            | LedgerError::NonPositiveAmount(_)
            | LedgerError::AmountTooLarge(_)
            | LedgerError::EmptyParticipants
            | LedgerError::NotAMember(_)
            | LedgerError::SelfSettlement => Self::Validation(message),
            LedgerError::AlreadyMember(_) => Self::Conflict(message),
            LedgerError::GroupNotFound(_) => Self::NotFound(message),
            LedgerError::Contended(_) => Self::Contended(message),
            LedgerError::UnbalancedLedger { .. } | LedgerError::UnbalancedInput(_) => {
                Self::InvariantViolation(message)
            }
        }
    }
}
