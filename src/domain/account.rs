//! Account
//!
//! An account holds a balance, enforces the withdrawal policy and owns its
//! history. Balance mutation happens only here; history appends are the
//! responsibility of `Transaction::register`, so that "record only on
//! success" has a single owner.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::history::History;
use super::money::{self, Balance};

/// Branch code shared by every account in this system.
pub const BRANCH_CODE: &str = "0001";

/// Per-account withdrawal policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalPolicy {
    /// Maximum amount for a single withdrawal.
    pub limit_per_withdrawal: Decimal,
    /// Maximum number of withdrawals recorded on the account.
    pub count_limit: u32,
}

impl Default for WithdrawalPolicy {
    fn default() -> Self {
        Self {
            limit_per_withdrawal: Decimal::from(1000),
            count_limit: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    number: u32,
    owner: String,
    balance: Balance,
    history: History,
    policy: WithdrawalPolicy,
}

/// Flat view of an account for listings and API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub number: u32,
    pub branch: &'static str,
    pub owner: String,
    pub balance: Decimal,
}

impl Account {
    /// Open an account with a zero balance and an empty history. The owner
    /// is the customer's national id, a back-reference only; the registry
    /// governs lifetimes.
    pub fn open(number: u32, owner: impl Into<String>, policy: WithdrawalPolicy) -> Self {
        Self {
            number,
            owner: owner.into(),
            balance: Balance::zero(),
            history: History::new(),
            policy,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn branch(&self) -> &'static str {
        BRANCH_CODE
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            number: self.number,
            branch: BRANCH_CODE,
            owner: self.owner.clone(),
            balance: self.balance.value(),
        }
    }

    /// Whether the balance is zero within the settlement tolerance.
    pub fn is_settled(&self) -> bool {
        money::is_settled(self.balance.value())
    }

    /// Credit the account. Fails on zero or negative amounts.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(amount));
        }
        self.balance = self.balance.credit(amount);
        Ok(())
    }

    /// Debit the account under withdrawal policy. Exactly one failure
    /// reason is surfaced per call, first matching condition wins:
    /// insufficient funds, then the per-withdrawal limit, then the
    /// withdrawal count limit, then an invalid amount.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), DomainError> {
        let available = self.balance.value();
        if amount > available {
            return Err(DomainError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        if amount > self.policy.limit_per_withdrawal {
            return Err(DomainError::WithdrawalLimitExceeded {
                limit: self.policy.limit_per_withdrawal,
            });
        }
        if self.history.withdrawal_count() >= self.policy.count_limit as usize {
            return Err(DomainError::WithdrawalCountExceeded {
                limit: self.policy.count_limit,
            });
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::InvalidAmount(amount));
        }

        self.balance = self
            .balance
            .debit(amount)
            .ok_or(DomainError::InsufficientFunds {
                requested: amount,
                available,
            })?;
        Ok(())
    }

    /// Direct debit for loan settlement, outside withdrawal policy.
    /// Returns the amount actually debited: the full amount when it is
    /// positive and covered by the balance, zero otherwise.
    pub fn debit_for_loan(&mut self, amount: Decimal) -> Decimal {
        if amount > Decimal::ZERO {
            if let Some(next) = self.balance.debit(amount) {
                self.balance = next;
                return amount;
            }
        }
        Decimal::ZERO
    }
}
