//! Customer
//!
//! A customer owns accounts and at most one loan record. The loan
//! operations that need the loan and the primary account at the same time
//! live here, where both fields can be borrowed side by side.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::account::Account;
use super::error::DomainError;
use super::loan::{Loan, LoanStatus, LoanSummary};
use super::transaction::Transaction;

#[derive(Debug, Clone)]
pub struct Customer {
    name: String,
    national_id: String,
    birth_date: NaiveDate,
    address: String,
    accounts: Vec<Account>,
    loan: Option<Loan>,
}

/// Outcome of a payoff attempt. A payoff that cannot cover the full
/// outstanding balance degrades to a partial direct debit.
#[derive(Debug, Clone, PartialEq)]
pub enum PayoffOutcome {
    Settled(LoanStatus),
    Partial { debited: Decimal, remaining: Decimal },
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        national_id: impl Into<String>,
        birth_date: NaiveDate,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            national_id: national_id.into(),
            birth_date,
            address: address.into(),
            accounts: Vec::new(),
            loan: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn loan(&self) -> Option<&Loan> {
        self.loan.as_ref()
    }

    pub fn add_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    /// Drop the named account. Guards (last account, balance, loan) are
    /// the service's job; this only detaches.
    pub(crate) fn remove_account(&mut self, number: u32) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|account| account.number() != number);
        self.accounts.len() != before
    }

    pub fn find_account(&self, number: u32) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number() == number)
    }

    /// The first account, implicit target of single-account operations.
    pub fn primary_account(&self) -> Result<&Account, DomainError> {
        self.accounts.first().ok_or(DomainError::NoAccount)
    }

    pub fn primary_account_mut(&mut self) -> Result<&mut Account, DomainError> {
        self.accounts.first_mut().ok_or(DomainError::NoAccount)
    }

    pub fn has_outstanding_loan(&self) -> bool {
        self.loan.as_ref().is_some_and(|loan| !loan.is_settled())
    }

    /// Contract a loan, replacing any existing record. The principal is
    /// credited to the primary account through a deposit transaction, so
    /// it shows up in the statement.
    pub fn contract_loan(
        &mut self,
        principal: Decimal,
        installments: u32,
        rate: Decimal,
    ) -> Result<LoanSummary, DomainError> {
        let loan = Loan::contract(principal, installments, rate)?;
        let account = self.accounts.first_mut().ok_or(DomainError::NoAccount)?;
        Transaction::deposit(principal).register(account)?;

        let summary = loan.summary();
        self.loan = Some(loan);
        Ok(summary)
    }

    /// Pay one installment from the primary account. The payment shares
    /// ordinary withdrawal policy; on failure the loan is untouched.
    pub fn pay_installment(&mut self) -> Result<LoanStatus, DomainError> {
        let loan = self
            .loan
            .as_mut()
            .filter(|loan| !loan.is_settled())
            .ok_or(DomainError::NoActiveLoan)?;
        if loan.all_installments_paid() {
            return Err(DomainError::AllInstallmentsPaid);
        }

        let account = self.accounts.first_mut().ok_or(DomainError::NoAccount)?;
        Transaction::loan_installment(loan.installment_amount()).register(account)?;

        loan.record_installment();
        Ok(loan.status())
    }

    /// Try to settle the full outstanding balance in one debit. When the
    /// balance cannot cover it, fall back to a partial direct debit of
    /// whatever the account holds; the partial debit is intentionally not
    /// recorded in the history.
    pub fn payoff_loan(&mut self) -> Result<PayoffOutcome, DomainError> {
        let loan = self
            .loan
            .as_mut()
            .filter(|loan| !loan.is_settled())
            .ok_or(DomainError::NoActiveLoan)?;
        let account = self.accounts.first_mut().ok_or(DomainError::NoAccount)?;

        let outstanding = loan.outstanding();
        match Transaction::loan_payoff(outstanding).register(account) {
            Ok(()) => {
                loan.settle();
                Ok(PayoffOutcome::Settled(loan.status()))
            }
            Err(_) => {
                let debited = account.debit_for_loan(account.balance().value());
                loan.apply_partial(debited);
                Ok(PayoffOutcome::Partial {
                    debited,
                    remaining: loan.outstanding(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::WithdrawalPolicy;
    use rust_decimal_macros::dec;

    fn customer_with_account() -> Customer {
        let mut customer = Customer::new(
            "Ana Souza",
            "111",
            NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            "12 Baker St",
        );
        customer.add_account(Account::open(1, "111", WithdrawalPolicy::default()));
        customer
    }

    #[test]
    fn contract_deposits_principal_not_total() {
        let mut customer = customer_with_account();
        let summary = customer.contract_loan(dec!(5000), 12, dec!(0.02)).unwrap();

        assert_eq!(summary.total, dec!(6200.00));
        assert_eq!(summary.installment_amount, dec!(516.67));
        assert_eq!(
            customer.primary_account().unwrap().balance().value(),
            dec!(5000)
        );
        assert_eq!(customer.primary_account().unwrap().history().len(), 1);
    }

    #[test]
    fn contract_requires_an_account() {
        let mut customer = Customer::new(
            "Bruno Lima",
            "222",
            NaiveDate::from_ymd_opt(1985, 1, 30).unwrap(),
            "34 Elm St",
        );
        assert!(matches!(
            customer.contract_loan(dec!(1000), 10, dec!(0.01)),
            Err(DomainError::NoAccount)
        ));
    }

    #[test]
    fn new_contract_replaces_old_record() {
        let mut customer = customer_with_account();
        customer.contract_loan(dec!(1000), 10, Decimal::ZERO).unwrap();
        customer.contract_loan(dec!(2000), 4, Decimal::ZERO).unwrap();

        let loan = customer.loan().unwrap();
        assert_eq!(loan.total(), dec!(2000));
        assert_eq!(loan.installment_amount(), dec!(500));
    }

    #[test]
    fn installment_failure_leaves_loan_unchanged() {
        let mut customer = customer_with_account();
        customer.contract_loan(dec!(1000), 2, Decimal::ZERO).unwrap();

        // Drain the balance below one installment.
        customer
            .primary_account_mut()
            .unwrap()
            .withdraw(dec!(900))
            .unwrap();

        let err = customer.pay_installment().unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds { .. }));

        let loan = customer.loan().unwrap();
        assert_eq!(loan.outstanding(), dec!(1000));
        assert!(!loan.all_installments_paid());
    }

    #[test]
    fn pay_installment_until_done() {
        let mut customer = customer_with_account();
        customer.contract_loan(dec!(600), 3, Decimal::ZERO).unwrap();

        for paid in 1..=3u32 {
            let status = customer.pay_installment().unwrap();
            assert_eq!(status.installments_paid, paid);
        }
        assert!(matches!(
            customer.pay_installment(),
            Err(DomainError::NoActiveLoan)
        ));
        assert_eq!(
            customer.primary_account().unwrap().balance().value(),
            Decimal::ZERO
        );
    }

    #[test]
    fn payoff_settles_when_funds_cover() {
        let mut customer = customer_with_account();
        customer
            .primary_account_mut()
            .unwrap()
            .deposit(dec!(2000))
            .unwrap();
        customer.contract_loan(dec!(1000), 10, dec!(0.01)).unwrap();

        // Balance 3000, outstanding 1100: full payoff bypasses limits.
        match customer.payoff_loan().unwrap() {
            PayoffOutcome::Settled(status) => {
                assert_eq!(status.outstanding, Decimal::ZERO);
                assert_eq!(status.installments_paid, status.installment_count);
            }
            other => panic!("expected settled payoff, got {other:?}"),
        }
        assert_eq!(
            customer.primary_account().unwrap().balance().value(),
            dec!(1900)
        );
    }

    #[test]
    fn payoff_falls_back_to_partial_debit() {
        let mut customer = customer_with_account();
        customer.contract_loan(dec!(1000), 10, Decimal::ZERO).unwrap();
        customer
            .primary_account_mut()
            .unwrap()
            .withdraw(dec!(800))
            .unwrap();

        // Balance 200 against outstanding 1000.
        match customer.payoff_loan().unwrap() {
            PayoffOutcome::Partial { debited, remaining } => {
                assert_eq!(debited, dec!(200));
                assert_eq!(remaining, dec!(800));
            }
            other => panic!("expected partial payoff, got {other:?}"),
        }
        assert_eq!(
            customer.primary_account().unwrap().balance().value(),
            Decimal::ZERO
        );
        assert!(customer.has_outstanding_loan());
    }
}
