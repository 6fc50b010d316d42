//! Equal-principal repayment: the same principal is repaid every month and
//! interest accrues on the balance outstanding before that month's repayment,
//! so the total payment declines over the life of the loan.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::plan::{AmortizationStrategy, MonthlyPayment};
use super::solver::monthly_rate;
use crate::error::LoanPlanError;
use crate::types::{Money, Months, Rate};
use crate::LoanPlanResult;

/// Minor-unit precision used when estimating the shortened duration.
const CENTS_DP: u32 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct EqualPrincipalStrategy;

impl AmortizationStrategy for EqualPrincipalStrategy {
    fn base_schedule(
        &self,
        principal: Money,
        duration_in_months: Months,
        annual_rate_percent: Rate,
    ) -> LoanPlanResult<Vec<MonthlyPayment>> {
        if duration_in_months == 0 {
            return Err(LoanPlanError::InvalidInput {
                field: "duration_in_months".into(),
                reason: "Equal-principal schedule needs at least one month".into(),
            });
        }

        let r = monthly_rate(annual_rate_percent);
        let principal_per_month = principal / Decimal::from(duration_in_months);

        let mut remaining = principal;
        let mut schedule = Vec::with_capacity(duration_in_months as usize);
        for _ in 0..duration_in_months {
            let interest = remaining * r;
            remaining -= principal_per_month;
            schedule.push(MonthlyPayment::new(principal_per_month, interest));
        }
        Ok(schedule)
    }

    /// `ceil(cents(remaining) / cents(next principal))`.
    ///
    /// Both operands are rounded to cents before dividing. This is not the
    /// same as full-precision division in boundary cases and the rounded
    /// form is the one schedules are reconciled against.
    fn duration_after_prepayment(
        &self,
        remaining_principal: Money,
        next_scheduled: &MonthlyPayment,
        _annual_rate_percent: Rate,
    ) -> LoanPlanResult<Months> {
        let per_month = next_scheduled.principal_amount.round_dp(CENTS_DP);
        if per_month <= Decimal::ZERO {
            return Err(LoanPlanError::DivisionByZero {
                context: "equal-principal duration after prepayment".into(),
            });
        }

        let months = (remaining_principal.round_dp(CENTS_DP) / per_month).ceil();
        months.to_u32().ok_or_else(|| LoanPlanError::InvalidInput {
            field: "remaining_principal".into(),
            reason: format!("{months} months is not a representable duration"),
        })
    }
}
