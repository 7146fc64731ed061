//! Domain error types
//!
//! Business rule violations and invariant failures, independent of the
//! front-end layers. Every variant carries a message suitable for showing
//! to the end user as-is; none of these are fatal to the process.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Zero or negative operation amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Debit larger than the available balance
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    /// Single withdrawal above the per-withdrawal limit
    #[error("Withdrawal exceeds the per-withdrawal limit of {limit}")]
    WithdrawalLimitExceeded { limit: Decimal },

    /// Too many withdrawals already recorded on the account
    #[error("Withdrawal count limit of {limit} reached")]
    WithdrawalCountExceeded { limit: u32 },

    /// National id collision on customer registration
    #[error("National id {0} is already registered")]
    DuplicateNationalId(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Account {0} not found")]
    AccountNotFound(u32),

    /// Operation requires an authenticated customer
    #[error("No customer is logged in")]
    NotLoggedIn,

    /// Customer has no account to operate on
    #[error("Customer has no account")]
    NoAccount,

    #[error("No active loan")]
    NoActiveLoan,

    #[error("All installments are already paid")]
    AllInstallmentsPaid,

    /// Bad parameters when simulating or contracting a loan
    #[error("Invalid loan terms: {0}")]
    InvalidLoanTerms(String),

    /// Customers must keep at least one account
    #[error("Cannot remove the last remaining account")]
    LastAccount,

    /// Accounts must be emptied before removal
    #[error("Account still holds a balance of {balance}")]
    NonZeroBalance { balance: Decimal },

    /// An active loan blocks account removal
    #[error("Customer has an active loan with outstanding balance {outstanding}")]
    OutstandingLoan { outstanding: Decimal },
}

impl DomainError {
    /// Errors caused by what the caller asked for, as opposed to a missing
    /// entity or a guarded invariant.
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InsufficientFunds { .. }
                | Self::WithdrawalLimitExceeded { .. }
                | Self::WithdrawalCountExceeded { .. }
                | Self::InvalidLoanTerms(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CustomerNotFound(_) | Self::AccountNotFound(_) | Self::NoAccount
        )
    }

    /// Guards that protect registry consistency rather than a single call.
    pub fn is_invariant_guard(&self) -> bool {
        matches!(
            self,
            Self::LastAccount
                | Self::NonZeroBalance { .. }
                | Self::OutstandingLoan { .. }
                | Self::DuplicateNationalId(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn classification() {
        let err = DomainError::InsufficientFunds {
            requested: dec!(100),
            available: dec!(50),
        };
        assert!(err.is_policy_violation());
        assert!(!err.is_not_found());

        assert!(DomainError::AccountNotFound(7).is_not_found());
        assert!(DomainError::LastAccount.is_invariant_guard());
    }

    #[test]
    fn messages_are_descriptive() {
        let err = DomainError::InsufficientFunds {
            requested: dec!(100),
            available: dec!(50),
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));

        let err = DomainError::WithdrawalCountExceeded { limit: 3 };
        assert!(err.to_string().contains('3'));
    }
}
