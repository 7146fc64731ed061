//! Banking service
//!
//! Orchestrates customers, accounts and loans on top of the registry, and
//! carries the session concept: one active customer per service instance.
//! The console and chat front-ends own a single `Bank`; the HTTP front-end
//! keeps one per session token. All results are typed; front-ends turn them
//! into text.

mod registry;

pub use registry::Registry;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    loan, Account, AccountSummary, Customer, DomainError, LedgerEntry, LoanQuote, LoanStatus,
    LoanSummary, PayoffOutcome, Transaction, WithdrawalPolicy,
};

/// History view plus the current balance, for statements.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub entries: Vec<LedgerEntry>,
    pub balance: Decimal,
}

#[derive(Debug, Default)]
pub struct Bank {
    registry: Registry,
    policy: WithdrawalPolicy,
    active: Option<String>,
}

impl Bank {
    pub fn new() -> Self {
        Self::with_policy(WithdrawalPolicy::default())
    }

    /// Build a service whose new accounts use the given withdrawal policy.
    pub fn with_policy(policy: WithdrawalPolicy) -> Self {
        Self {
            registry: Registry::new(),
            policy,
            active: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ---------- Customers & session ----------

    /// Register a customer. The national id must be unique.
    pub fn register_customer(
        &mut self,
        name: impl Into<String>,
        national_id: impl Into<String>,
        birth_date: NaiveDate,
        address: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.registry
            .insert_customer(Customer::new(name, national_id, birth_date, address))
    }

    /// Authenticate by national id, making the customer active.
    pub fn login(&mut self, national_id: &str) -> Result<&Customer, DomainError> {
        if self.registry.customer(national_id).is_none() {
            return Err(DomainError::CustomerNotFound(national_id.to_string()));
        }
        self.active = Some(national_id.to_string());
        self.registry
            .customer(national_id)
            .ok_or_else(|| DomainError::CustomerNotFound(national_id.to_string()))
    }

    pub fn logout(&mut self) {
        self.active = None;
    }

    pub fn active_customer(&self) -> Result<&Customer, DomainError> {
        let id = self.active.as_deref().ok_or(DomainError::NotLoggedIn)?;
        self.registry
            .customer(id)
            .ok_or_else(|| DomainError::CustomerNotFound(id.to_string()))
    }

    fn active_customer_mut(&mut self) -> Result<&mut Customer, DomainError> {
        let id = self.active.clone().ok_or(DomainError::NotLoggedIn)?;
        self.registry
            .customer_mut(&id)
            .ok_or(DomainError::CustomerNotFound(id))
    }

    // ---------- Accounts ----------

    /// Open an account for the active customer.
    pub fn open_account(&mut self) -> Result<AccountSummary, DomainError> {
        let id = self.active.clone().ok_or(DomainError::NotLoggedIn)?;
        if self.registry.customer(&id).is_none() {
            return Err(DomainError::CustomerNotFound(id));
        }

        let number = self.registry.allocate_account_number();
        let account = Account::open(number, id.clone(), self.policy);
        let summary = account.summary();

        let customer = self
            .registry
            .customer_mut(&id)
            .ok_or_else(|| DomainError::CustomerNotFound(id.clone()))?;
        customer.add_account(account);
        self.registry.index_account(number, id);
        Ok(summary)
    }

    /// Remove an account of the active customer. Refused with the first
    /// failing reason: last remaining account, unknown account, leftover
    /// balance, or an active loan.
    pub fn remove_account(&mut self, number: u32) -> Result<(), DomainError> {
        let customer = self.active_customer_mut()?;

        if customer.accounts().len() <= 1 {
            return Err(DomainError::LastAccount);
        }
        let account = customer
            .find_account(number)
            .ok_or(DomainError::AccountNotFound(number))?;
        if !account.is_settled() {
            return Err(DomainError::NonZeroBalance {
                balance: account.balance().value(),
            });
        }
        if customer.has_outstanding_loan() {
            let outstanding = customer
                .loan()
                .map(|loan| loan.outstanding())
                .unwrap_or_default();
            return Err(DomainError::OutstandingLoan { outstanding });
        }

        customer.remove_account(number);
        self.registry.release_account(number);
        Ok(())
    }

    pub fn list_accounts(&self) -> Result<Vec<AccountSummary>, DomainError> {
        Ok(self
            .active_customer()?
            .accounts()
            .iter()
            .map(Account::summary)
            .collect())
    }

    // ---------- Money movements ----------

    /// Deposit into the active customer's primary account. Returns the new
    /// balance.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, DomainError> {
        let account = self.active_customer_mut()?.primary_account_mut()?;
        Transaction::deposit(amount).register(account)?;
        Ok(account.balance().value())
    }

    /// Withdraw from the active customer's primary account. Returns the new
    /// balance.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, DomainError> {
        let account = self.active_customer_mut()?.primary_account_mut()?;
        Transaction::withdrawal(amount).register(account)?;
        Ok(account.balance().value())
    }

    pub fn balance(&self) -> Result<Decimal, DomainError> {
        Ok(self.active_customer()?.primary_account()?.balance().value())
    }

    pub fn statement(&self) -> Result<Statement, DomainError> {
        let account = self.active_customer()?.primary_account()?;
        Ok(Statement {
            entries: account.history().entries().to_vec(),
            balance: account.balance().value(),
        })
    }

    // ---------- Loans ----------

    /// Quote a loan. Pure; nothing is mutated.
    pub fn simulate_loan(
        &self,
        principal: Decimal,
        installments: u32,
        rate: Decimal,
    ) -> Result<LoanQuote, DomainError> {
        loan::simulate(principal, installments, rate)
    }

    /// Contract a loan for the active customer and deposit the principal
    /// into the primary account.
    pub fn contract_loan(
        &mut self,
        principal: Decimal,
        installments: u32,
        rate: Decimal,
    ) -> Result<LoanSummary, DomainError> {
        self.active_customer_mut()?
            .contract_loan(principal, installments, rate)
    }

    pub fn pay_installment(&mut self) -> Result<LoanStatus, DomainError> {
        self.active_customer_mut()?.pay_installment()
    }

    pub fn payoff_loan(&mut self) -> Result<PayoffOutcome, DomainError> {
        self.active_customer_mut()?.payoff_loan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bank_with_login(id: &str) -> Bank {
        let mut bank = Bank::new();
        bank.register_customer(
            "Ana Souza",
            id,
            NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            "12 Baker St",
        )
        .unwrap();
        bank.login(id).unwrap();
        bank
    }

    #[test]
    fn operations_require_login() {
        let mut bank = Bank::new();
        assert_eq!(bank.deposit(dec!(10)).unwrap_err(), DomainError::NotLoggedIn);
        assert_eq!(bank.balance().unwrap_err(), DomainError::NotLoggedIn);
        assert_eq!(bank.open_account().unwrap_err(), DomainError::NotLoggedIn);
    }

    #[test]
    fn login_unknown_customer() {
        let mut bank = Bank::new();
        assert!(matches!(
            bank.login("999"),
            Err(DomainError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn logout_clears_the_session() {
        let mut bank = bank_with_login("111");
        bank.open_account().unwrap();
        bank.logout();
        assert_eq!(bank.balance().unwrap_err(), DomainError::NotLoggedIn);
    }

    #[test]
    fn accounts_are_numbered_sequentially() {
        let mut bank = bank_with_login("111");
        let first = bank.open_account().unwrap();
        let second = bank.open_account().unwrap();

        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);
        assert_eq!(first.branch, "0001");
        assert_eq!(bank.list_accounts().unwrap().len(), 2);
    }

    #[test]
    fn deposit_and_withdraw_roundtrip() {
        let mut bank = bank_with_login("111");
        bank.open_account().unwrap();

        assert_eq!(bank.deposit(dec!(500)).unwrap(), dec!(500));
        assert_eq!(bank.withdraw(dec!(120)).unwrap(), dec!(380));
        assert_eq!(bank.balance().unwrap(), dec!(380));

        let statement = bank.statement().unwrap();
        assert_eq!(statement.entries.len(), 2);
        assert_eq!(statement.balance, dec!(380));
    }

    #[test]
    fn operations_without_account() {
        let mut bank = bank_with_login("111");
        assert_eq!(bank.deposit(dec!(10)).unwrap_err(), DomainError::NoAccount);
        assert_eq!(bank.balance().unwrap_err(), DomainError::NoAccount);
    }

    #[test]
    fn remove_account_happy_path() {
        let mut bank = bank_with_login("111");
        bank.open_account().unwrap();
        bank.open_account().unwrap();

        bank.remove_account(2).unwrap();
        assert_eq!(bank.list_accounts().unwrap().len(), 1);
        assert_eq!(bank.registry().account_count(), 1);

        // Gone from the global index as well.
        assert!(bank.registry().account_owner(2).is_none());
    }

    #[test]
    fn remove_account_of_another_customer_is_not_found() {
        let mut bank = bank_with_login("111");
        bank.open_account().unwrap();
        bank.open_account().unwrap();

        bank.register_customer(
            "Bruno Lima",
            "222",
            NaiveDate::from_ymd_opt(1985, 1, 30).unwrap(),
            "34 Elm St",
        )
        .unwrap();
        bank.login("222").unwrap();
        bank.open_account().unwrap();
        bank.open_account().unwrap();

        // Account 1 belongs to customer 111.
        assert_eq!(
            bank.remove_account(1).unwrap_err(),
            DomainError::AccountNotFound(1)
        );
    }
}
