//! Customer and account registry
//!
//! Explicit registry object owned by the banking service. Customers are
//! keyed by national id; a global index maps account numbers back to their
//! owners. Account numbers come from a monotonic counter and are never
//! reused, even after an account is removed.

use std::collections::HashMap;

use crate::domain::{Customer, DomainError};

#[derive(Debug, Default)]
pub struct Registry {
    customers: HashMap<String, Customer>,
    account_owner: HashMap<u32, String>,
    next_account_number: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a customer, enforcing national id uniqueness.
    pub fn insert_customer(&mut self, customer: Customer) -> Result<(), DomainError> {
        let id = customer.national_id().to_string();
        if self.customers.contains_key(&id) {
            return Err(DomainError::DuplicateNationalId(id));
        }
        self.customers.insert(id, customer);
        Ok(())
    }

    pub fn customer(&self, national_id: &str) -> Option<&Customer> {
        self.customers.get(national_id)
    }

    pub fn customer_mut(&mut self, national_id: &str) -> Option<&mut Customer> {
        self.customers.get_mut(national_id)
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Hand out the next account number. Sequential from 1.
    pub fn allocate_account_number(&mut self) -> u32 {
        self.next_account_number += 1;
        self.next_account_number
    }

    pub fn index_account(&mut self, number: u32, owner: impl Into<String>) {
        self.account_owner.insert(number, owner.into());
    }

    pub fn release_account(&mut self, number: u32) {
        self.account_owner.remove(&number);
    }

    pub fn account_owner(&self, number: u32) -> Option<&str> {
        self.account_owner.get(&number).map(String::as_str)
    }

    pub fn account_count(&self) -> usize {
        self.account_owner.len()
    }
}
