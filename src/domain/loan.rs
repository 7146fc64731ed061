//! Loan amortization
//!
//! A loan is contracted from a quote, then paid down one installment at a
//! time or settled in full. Interest is simple-linear: the total owed is
//! `principal * (1 + rate * installments)`. Outstanding balance never goes
//! below zero and installments paid never exceed the installment count.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;

/// Result of a simulation: total owed and the per-installment amount,
/// both rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanQuote {
    pub total: Decimal,
    pub installment: Decimal,
}

/// Compute a quote. Pure: no state anywhere is touched.
pub fn simulate(
    principal: Decimal,
    installments: u32,
    rate: Decimal,
) -> Result<LoanQuote, DomainError> {
    if principal <= Decimal::ZERO {
        return Err(DomainError::InvalidLoanTerms(format!(
            "principal must be positive (got {principal})"
        )));
    }
    if installments == 0 {
        return Err(DomainError::InvalidLoanTerms(
            "installment count must be positive".to_string(),
        ));
    }
    if rate < Decimal::ZERO {
        return Err(DomainError::InvalidLoanTerms(format!(
            "interest rate cannot be negative (got {rate})"
        )));
    }

    let count = Decimal::from(installments);
    let total = (principal * (Decimal::ONE + rate * count)).round_dp(2);
    let installment = (total / count).round_dp(2);
    Ok(LoanQuote { total, installment })
}

/// Amortization state attached to a customer. One record per customer; a
/// new contract overwrites any prior one.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    principal: Decimal,
    installment_count: u32,
    installment_amount: Decimal,
    installments_paid: u32,
    outstanding: Decimal,
    total: Decimal,
}

/// Snapshot of loan progress for front-ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanStatus {
    pub installments_paid: u32,
    pub installment_count: u32,
    pub installment_amount: Decimal,
    pub outstanding: Decimal,
    pub total: Decimal,
}

/// What a freshly contracted loan looks like.
#[derive(Debug, Clone, Serialize)]
pub struct LoanSummary {
    pub principal: Decimal,
    pub total: Decimal,
    pub installment_count: u32,
    pub installment_amount: Decimal,
}

impl Loan {
    /// Contract a loan from a quote.
    pub fn contract(
        principal: Decimal,
        installments: u32,
        rate: Decimal,
    ) -> Result<Self, DomainError> {
        let quote = simulate(principal, installments, rate)?;
        Ok(Self {
            principal,
            installment_count: installments,
            installment_amount: quote.installment,
            installments_paid: 0,
            outstanding: quote.total,
            total: quote.total,
        })
    }

    pub fn principal(&self) -> Decimal {
        self.principal
    }

    pub fn installment_amount(&self) -> Decimal {
        self.installment_amount
    }

    pub fn outstanding(&self) -> Decimal {
        self.outstanding
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Nothing left to pay.
    pub fn is_settled(&self) -> bool {
        self.outstanding <= Decimal::ZERO
    }

    pub fn all_installments_paid(&self) -> bool {
        self.installments_paid >= self.installment_count
    }

    /// Account for one paid installment, clamping outstanding at zero.
    pub fn record_installment(&mut self) {
        self.installments_paid += 1;
        self.outstanding = (self.outstanding - self.installment_amount).max(Decimal::ZERO);
    }

    /// Close the loan after a full payoff.
    pub fn settle(&mut self) {
        self.outstanding = Decimal::ZERO;
        self.installments_paid = self.installment_count;
    }

    /// Reduce outstanding by a partial payoff debit.
    pub fn apply_partial(&mut self, debited: Decimal) {
        self.outstanding = (self.outstanding - debited).max(Decimal::ZERO);
    }

    pub fn status(&self) -> LoanStatus {
        LoanStatus {
            installments_paid: self.installments_paid,
            installment_count: self.installment_count,
            installment_amount: self.installment_amount,
            outstanding: self.outstanding,
            total: self.total,
        }
    }

    pub fn summary(&self) -> LoanSummary {
        LoanSummary {
            principal: self.principal,
            total: self.total,
            installment_count: self.installment_count,
            installment_amount: self.installment_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn simulate_simple_linear_interest() {
        let quote = simulate(dec!(5000), 12, dec!(0.02)).unwrap();
        assert_eq!(quote.total, dec!(6200.00));
        assert_eq!(quote.installment, dec!(516.67));

        // Pure: the same inputs always give the same quote.
        assert_eq!(quote, simulate(dec!(5000), 12, dec!(0.02)).unwrap());
    }

    #[test]
    fn simulate_rejects_bad_terms() {
        assert!(matches!(
            simulate(Decimal::ZERO, 12, dec!(0.02)),
            Err(DomainError::InvalidLoanTerms(_))
        ));
        assert!(matches!(
            simulate(dec!(100), 0, dec!(0.02)),
            Err(DomainError::InvalidLoanTerms(_))
        ));
        assert!(matches!(
            simulate(dec!(100), 12, dec!(-0.01)),
            Err(DomainError::InvalidLoanTerms(_))
        ));
    }

    #[test]
    fn installments_pay_down_to_zero() {
        let mut loan = Loan::contract(dec!(1200), 12, Decimal::ZERO).unwrap();
        assert_eq!(loan.installment_amount(), dec!(100));

        for _ in 0..12 {
            assert!(!loan.is_settled());
            loan.record_installment();
            assert!(loan.outstanding() >= Decimal::ZERO);
            assert!(loan.outstanding() <= loan.total());
        }
        assert!(loan.is_settled());
        assert!(loan.all_installments_paid());
    }

    #[test]
    fn outstanding_clamps_at_zero() {
        // Rounded installments can overshoot the total on the last payment.
        let mut loan = Loan::contract(dec!(100), 3, Decimal::ZERO).unwrap();
        assert_eq!(loan.installment_amount(), dec!(33.33));

        loan.record_installment();
        loan.record_installment();
        loan.record_installment();
        assert_eq!(loan.outstanding(), dec!(0.01));
        assert!(loan.all_installments_paid());

        loan.apply_partial(dec!(5));
        assert_eq!(loan.outstanding(), Decimal::ZERO);
    }

    #[test]
    fn settle_closes_the_loan() {
        let mut loan = Loan::contract(dec!(5000), 12, dec!(0.02)).unwrap();
        loan.settle();
        assert!(loan.is_settled());
        assert!(loan.all_installments_paid());
        assert_eq!(loan.outstanding(), Decimal::ZERO);
    }
}
