//! Banking domain model
//!
//! Pure in-memory types: money, accounts, transactions, history, customers
//! and loans. No I/O and no framework types; the service and the front-ends
//! sit on top of this module.

pub mod account;
pub mod customer;
pub mod error;
pub mod history;
pub mod loan;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountSummary, WithdrawalPolicy, BRANCH_CODE};
pub use customer::{Customer, PayoffOutcome};
pub use error::DomainError;
pub use history::{History, LedgerEntry};
pub use loan::{simulate, Loan, LoanQuote, LoanStatus, LoanSummary};
pub use money::Balance;
pub use transaction::{Transaction, TransactionKind};
