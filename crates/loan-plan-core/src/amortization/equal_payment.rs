//! Equal-principal-and-interest (level payment) repayment: the monthly total
//! is fixed by the solver and the split between principal and interest
//! shifts towards principal as the balance falls.

use rust_decimal::prelude::ToPrimitive;

use super::plan::{AmortizationStrategy, MonthlyPayment};
use super::solver::{level_monthly_payment, monthly_rate, months_to_repay};
use crate::error::LoanPlanError;
use crate::types::{Money, Months, Rate};
use crate::LoanPlanResult;

/// Decimal places kept from the solved month count before rounding up.
/// Digits beyond this are logarithm series noise, not a partial month.
const SOLVED_MONTHS_DP: u32 = 9;

#[derive(Debug, Clone, Copy, Default)]
pub struct EqualPaymentStrategy;

impl AmortizationStrategy for EqualPaymentStrategy {
    fn base_schedule(
        &self,
        principal: Money,
        duration_in_months: Months,
        annual_rate_percent: Rate,
    ) -> LoanPlanResult<Vec<MonthlyPayment>> {
        let monthly_total = level_monthly_payment(principal, duration_in_months, annual_rate_percent)?;
        let r = monthly_rate(annual_rate_percent);

        let mut remaining = principal;
        let mut schedule = Vec::with_capacity(duration_in_months as usize);
        for _ in 0..duration_in_months {
            let interest = remaining * r;
            let principal_part = monthly_total - interest;
            remaining -= principal_part;
            schedule.push(MonthlyPayment::new(principal_part, interest));
        }
        log::trace!(
            "level payment segment: {duration_in_months} months of {monthly_total} on {principal}"
        );
        Ok(schedule)
    }

    /// Keeps the payment that was due next and solves for how many months it
    /// takes to repay the reduced balance. A partial final month is always
    /// completed in full.
    fn duration_after_prepayment(
        &self,
        remaining_principal: Money,
        next_scheduled: &MonthlyPayment,
        annual_rate_percent: Rate,
    ) -> LoanPlanResult<Months> {
        let months = months_to_repay(remaining_principal, annual_rate_percent, next_scheduled.total())?
            .round_dp(SOLVED_MONTHS_DP)
            .ceil();
        months.to_u32().ok_or_else(|| LoanPlanError::InvalidInput {
            field: "remaining_principal".into(),
            reason: format!("{months} months is not a representable duration"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_is_constant() {
        let schedule = EqualPaymentStrategy
            .base_schedule(dec!(100_000), 12, dec!(12))
            .unwrap();
        assert_eq!(schedule.len(), 12);
        for month in &schedule {
            assert_eq!(month.total().round_dp(2), dec!(8884.88));
        }
    }

    #[test]
    fn test_principal_share_grows() {
        let schedule = EqualPaymentStrategy
            .base_schedule(dec!(100_000), 12, dec!(12))
            .unwrap();
        assert_eq!(schedule[0].interest_amount, dec!(1000));
        assert!(schedule
            .windows(2)
            .all(|w| w[1].principal_amount > w[0].principal_amount));
    }

    #[test]
    fn test_balance_reaches_zero() {
        let schedule = EqualPaymentStrategy
            .base_schedule(dec!(1_100_000), 240, dec!(3.15))
            .unwrap();
        let repaid: Decimal = schedule.iter().map(|m| m.principal_amount).sum();
        assert!((repaid - dec!(1_100_000)).abs() < dec!(0.000001), "repaid {repaid}");
    }

    #[test]
    fn test_duration_keeps_next_payment() {
        // Pay 8,884.88 against half the balance: roughly six months at 1%.
        let next = MonthlyPayment::new(dec!(7884.878867834166), dec!(1000));
        let months = EqualPaymentStrategy
            .duration_after_prepayment(dec!(50_000), &next, dec!(12))
            .unwrap();
        assert_eq!(months, 6);
    }

    #[test]
    fn test_duration_at_zero_rate() {
        let next = MonthlyPayment::new(dec!(1000), dec!(0));
        let months = EqualPaymentStrategy
            .duration_after_prepayment(dec!(60_000), &next, dec!(0))
            .unwrap();
        assert_eq!(months, 60);
    }

    #[test]
    fn test_duration_for_paid_off_balance_is_zero() {
        let next = MonthlyPayment::new(dec!(900), dec!(100));
        let months = EqualPaymentStrategy
            .duration_after_prepayment(Decimal::ZERO, &next, dec!(5))
            .unwrap();
        assert_eq!(months, 0);
    }
}
