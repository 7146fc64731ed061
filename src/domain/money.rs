//! Money primitives
//!
//! Account balances are wrapped in a `Balance` newtype so a negative balance
//! cannot exist in the system. Operation amounts stay plain `Decimal`:
//! validation of amounts belongs to the account policy checks, which report
//! failure reasons in a fixed order.

use rust_decimal::Decimal;
use std::fmt;

/// Tolerance used when an account must be "empty" (closing an account).
/// Guards against residue from upstream float conversions.
const SETTLEMENT_SCALE: u32 = 9;

/// Check whether a monetary value is zero within the settlement tolerance.
pub fn is_settled(value: Decimal) -> bool {
    value.abs() <= Decimal::new(1, SETTLEMENT_SCALE)
}

/// An account balance. Zero or positive, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance(Decimal);

impl Balance {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Wrap a raw value, rejecting negatives.
    pub fn new(value: Decimal) -> Option<Self> {
        (value >= Decimal::ZERO).then_some(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whether a debit of `amount` would keep the balance non-negative.
    pub fn is_sufficient_for(&self, amount: Decimal) -> bool {
        self.0 >= amount
    }

    /// Add to the balance. Callers validate that `amount` is positive.
    pub fn credit(&self, amount: Decimal) -> Balance {
        Balance(self.0 + amount)
    }

    /// Subtract from the balance, or `None` if it would go negative.
    pub fn debit(&self, amount: Decimal) -> Option<Balance> {
        Balance::new(self.0 - amount)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_rejects_negative() {
        assert!(Balance::new(dec!(-0.01)).is_none());
        assert!(Balance::new(Decimal::ZERO).is_some());
    }

    #[test]
    fn credit_and_debit() {
        let balance = Balance::zero().credit(dec!(100));
        assert_eq!(balance.value(), dec!(100));

        let balance = balance.debit(dec!(30)).unwrap();
        assert_eq!(balance.value(), dec!(70));

        assert!(balance.debit(dec!(70.01)).is_none());
        assert_eq!(balance.debit(dec!(70)).unwrap().value(), Decimal::ZERO);
    }

    #[test]
    fn settlement_tolerance() {
        assert!(is_settled(Decimal::ZERO));
        assert!(is_settled(dec!(0.000000001)));
        assert!(!is_settled(dec!(0.00000001)));
        assert!(!is_settled(dec!(50)));
    }
}
