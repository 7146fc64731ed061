//! Transaction variants
//!
//! A `Transaction` is an immutable record of one monetary movement. The set
//! of kinds is closed: deposits, withdrawals, loan installment payments and
//! loan payoffs. Registering a transaction against an account either applies
//! it fully or not at all, and only a successful registration is appended to
//! the account history. That invariant lives here and nowhere else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::Account;
use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    LoanInstallment,
    LoanPayoff,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
            Self::LoanInstallment => "Loan installment",
            Self::LoanPayoff => "Loan payoff",
        };
        f.write_str(label)
    }
}

/// One monetary movement. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    kind: TransactionKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    fn new(kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            kind,
            amount,
            timestamp: Utc::now(),
        }
    }

    pub fn deposit(amount: Decimal) -> Self {
        Self::new(TransactionKind::Deposit, amount)
    }

    pub fn withdrawal(amount: Decimal) -> Self {
        Self::new(TransactionKind::Withdrawal, amount)
    }

    pub fn loan_installment(amount: Decimal) -> Self {
        Self::new(TransactionKind::LoanInstallment, amount)
    }

    pub fn loan_payoff(amount: Decimal) -> Self {
        Self::new(TransactionKind::LoanPayoff, amount)
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Apply this transaction to an account. On success the transaction is
    /// appended to the account history; on failure the account is untouched
    /// and the first failing check is reported.
    pub fn register(&self, account: &mut Account) -> Result<(), DomainError> {
        match self.kind {
            TransactionKind::Deposit => account.deposit(self.amount)?,
            // Installment payments share the ordinary withdrawal policy.
            TransactionKind::Withdrawal | TransactionKind::LoanInstallment => {
                account.withdraw(self.amount)?
            }
            TransactionKind::LoanPayoff => {
                // A payoff is recorded only when the full amount could be
                // debited in one call. Partial payoffs are handled by the
                // loan lifecycle and never reach the history.
                let available = account.balance().value();
                if !account.balance().is_sufficient_for(self.amount) {
                    return Err(DomainError::InsufficientFunds {
                        requested: self.amount,
                        available,
                    });
                }
                let debited = account.debit_for_loan(self.amount);
                if debited < self.amount {
                    return Err(DomainError::InsufficientFunds {
                        requested: self.amount,
                        available,
                    });
                }
            }
        }

        account.history_mut().record(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::WithdrawalPolicy;
    use rust_decimal_macros::dec;

    fn account() -> Account {
        Account::open(1, "111", WithdrawalPolicy::default())
    }

    #[test]
    fn deposit_registers_and_records() {
        let mut account = account();
        Transaction::deposit(dec!(100)).register(&mut account).unwrap();

        assert_eq!(account.balance().value(), dec!(100));
        assert_eq!(account.history().len(), 1);
        assert_eq!(
            account.history().entries()[0].kind,
            TransactionKind::Deposit
        );
    }

    #[test]
    fn failed_withdrawal_leaves_no_trace() {
        let mut account = account();
        Transaction::deposit(dec!(100)).register(&mut account).unwrap();

        let err = Transaction::withdrawal(dec!(500))
            .register(&mut account)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds { .. }));
        assert_eq!(account.balance().value(), dec!(100));
        assert_eq!(account.history().len(), 1);
    }

    #[test]
    fn payoff_is_all_or_nothing() {
        let mut account = account();
        Transaction::deposit(dec!(100)).register(&mut account).unwrap();

        // Above the withdrawal limit but within balance rules: payoffs
        // bypass withdrawal policy entirely.
        let err = Transaction::loan_payoff(dec!(150))
            .register(&mut account)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds { .. }));
        assert_eq!(account.balance().value(), dec!(100));
        assert_eq!(account.history().len(), 1);

        Transaction::loan_payoff(dec!(100))
            .register(&mut account)
            .unwrap();
        assert_eq!(account.balance().value(), Decimal::ZERO);
        assert_eq!(
            account.history().entries()[1].kind,
            TransactionKind::LoanPayoff
        );
    }

    #[test]
    fn payoff_bypasses_withdrawal_limit() {
        let mut account = account();
        Transaction::deposit(dec!(5000)).register(&mut account).unwrap();

        // 2000 is above the default per-withdrawal limit of 1000.
        Transaction::loan_payoff(dec!(2000))
            .register(&mut account)
            .unwrap();
        assert_eq!(account.balance().value(), dec!(3000));
    }
}
