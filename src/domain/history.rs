//! Account history
//!
//! Append-only log of the transactions that succeeded against one account.
//! Created together with its account, never pruned.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::{Transaction, TransactionKind};

/// One line of the log: what happened, for how much, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<LedgerEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry for a transaction that succeeded.
    pub(crate) fn record(&mut self, transaction: &Transaction) {
        self.entries.push(LedgerEntry {
            kind: transaction.kind(),
            amount: transaction.amount(),
            timestamp: transaction.timestamp(),
        });
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of ordinary withdrawals on record. Loan installments pass
    /// through withdrawal policy when registered but are not counted here.
    pub fn withdrawal_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.kind == TransactionKind::Withdrawal)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn counts_only_ordinary_withdrawals() {
        let mut history = History::new();
        history.record(&Transaction::deposit(dec!(100)));
        history.record(&Transaction::withdrawal(dec!(10)));
        history.record(&Transaction::loan_installment(dec!(10)));
        history.record(&Transaction::withdrawal(dec!(10)));
        history.record(&Transaction::loan_payoff(dec!(10)));

        assert_eq!(history.len(), 5);
        assert_eq!(history.withdrawal_count(), 2);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut history = History::new();
        history.record(&Transaction::deposit(dec!(1)));
        history.record(&Transaction::withdrawal(dec!(2)));

        let kinds: Vec<_> = history.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![TransactionKind::Deposit, TransactionKind::Withdrawal]
        );
    }
}
