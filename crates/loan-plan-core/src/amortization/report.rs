//! Repayment-plan report: the spliced schedule with a running balance, plan
//! totals, and a side-by-side comparison of the two repayment methods.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::plan::{compute_schedule, LoanTerms, MonthlyPayment, RepaymentMethod};
use crate::types::{with_metadata, ComputationOutput, Money, Months};
use crate::LoanPlanResult;

const MONTHS_PER_YEAR: Months = 12;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Input for a repayment plan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentPlanInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub repayment_method: RepaymentMethod,
}

/// A single month in the printed schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based month since the first payment.
    pub month: Months,
    /// 1-based loan year.
    pub year: Months,
    /// 1..=12 within the loan year.
    pub month_of_year: Months,
    pub total_payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Balance after this month's principal (including any lump sum).
    pub remaining_principal: Money,
}

/// Totals for a computed plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub repayment_method: RepaymentMethod,
    pub months: usize,
    pub total_principal: Money,
    pub total_interest: Money,
    /// Principal + interest.
    pub total_repayment: Money,
    pub first_payment: Money,
    pub last_payment: Money,
    pub max_payment: Money,
    pub min_payment: Money,
    /// Sum of all prepayment lump sums.
    pub total_prepaid: Money,
    /// Interest without prepayments minus interest with them.
    pub interest_saved: Money,
}

/// Output of a repayment plan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentPlanOutput {
    pub summary: PlanSummary,
    pub schedule: Vec<ScheduleRow>,
}

/// Both repayment methods applied to the same loan terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodComparison {
    pub equal_principal: PlanSummary,
    pub equal_principal_and_interest: PlanSummary,
    /// Equal-payment interest minus equal-principal interest.
    pub interest_difference: Money,
    pub lower_interest_method: RepaymentMethod,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the spliced schedule for the input and report it month by month.
pub fn build_repayment_plan(
    input: &RepaymentPlanInput,
) -> LoanPlanResult<ComputationOutput<RepaymentPlanOutput>> {
    let start = Instant::now();
    let terms = &input.terms;
    terms.validate()?;

    let warnings = collect_warnings(terms);
    let schedule = compute_schedule(terms, input.repayment_method)?;
    let summary = summarize(terms, input.repayment_method, &schedule)?;
    let rows = schedule_rows(terms.principal, &schedule);

    let output = RepaymentPlanOutput {
        summary,
        schedule: rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan amortization with prepayment splicing",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "duration_years": terms.duration_years.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "repayment_method": input.repayment_method,
            "prepayments": terms.prepayments.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Summaries for both repayment methods over the same terms.
pub fn compare_repayment_methods(
    terms: &LoanTerms,
) -> LoanPlanResult<ComputationOutput<MethodComparison>> {
    let start = Instant::now();
    terms.validate()?;

    let warnings = collect_warnings(terms);

    let ep_schedule = compute_schedule(terms, RepaymentMethod::EqualPrincipal)?;
    let equal_principal = summarize(terms, RepaymentMethod::EqualPrincipal, &ep_schedule)?;

    let epi_schedule = compute_schedule(terms, RepaymentMethod::EqualPrincipalAndInterest)?;
    let equal_principal_and_interest =
        summarize(terms, RepaymentMethod::EqualPrincipalAndInterest, &epi_schedule)?;

    let interest_difference =
        equal_principal_and_interest.total_interest - equal_principal.total_interest;
    let lower_interest_method = if interest_difference < Decimal::ZERO {
        RepaymentMethod::EqualPrincipalAndInterest
    } else {
        RepaymentMethod::EqualPrincipal
    };

    let output = MethodComparison {
        equal_principal,
        equal_principal_and_interest,
        interest_difference,
        lower_interest_method,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equal-principal vs equal-payment comparison",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "duration_years": terms.duration_years.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "prepayments": terms.prepayments.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Attach month numbering and the running balance to a schedule.
pub fn schedule_rows(principal: Money, schedule: &[MonthlyPayment]) -> Vec<ScheduleRow> {
    let mut remaining = principal;
    schedule
        .iter()
        .zip(1..)
        .map(|(payment, month): (&MonthlyPayment, Months)| {
            remaining -= payment.principal_amount;
            ScheduleRow {
                month,
                year: (month - 1) / MONTHS_PER_YEAR + 1,
                month_of_year: (month - 1) % MONTHS_PER_YEAR + 1,
                total_payment: payment.total(),
                principal: payment.principal_amount,
                interest: payment.interest_amount,
                remaining_principal: remaining,
            }
        })
        .collect()
}

/// Totals for `schedule`, with interest saved measured against the same
/// terms without prepayments.
pub fn summarize(
    terms: &LoanTerms,
    method: RepaymentMethod,
    schedule: &[MonthlyPayment],
) -> LoanPlanResult<PlanSummary> {
    let total_principal: Money = schedule.iter().map(|m| m.principal_amount).sum();
    let interest = total_interest(schedule);
    let total_prepaid: Money = terms.prepayments.iter().map(|p| p.amount).sum();

    let interest_saved = if terms.prepayments.is_empty() {
        Decimal::ZERO
    } else {
        let baseline = compute_schedule(&terms.without_prepayments(), method)?;
        total_interest(&baseline) - interest
    };

    let totals: Vec<Money> = schedule.iter().map(MonthlyPayment::total).collect();

    Ok(PlanSummary {
        repayment_method: method,
        months: schedule.len(),
        total_principal,
        total_interest: interest,
        total_repayment: total_principal + interest,
        first_payment: totals.first().copied().unwrap_or(Decimal::ZERO),
        last_payment: totals.last().copied().unwrap_or(Decimal::ZERO),
        max_payment: totals.iter().copied().max().unwrap_or(Decimal::ZERO),
        min_payment: totals.iter().copied().min().unwrap_or(Decimal::ZERO),
        total_prepaid,
        interest_saved,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn total_interest(schedule: &[MonthlyPayment]) -> Money {
    schedule.iter().map(|m| m.interest_amount).sum()
}

fn collect_warnings(terms: &LoanTerms) -> Vec<String> {
    let mut warnings = Vec::new();
    if !terms.prepayments_in_order() {
        warnings.push(
            "Prepayments are not in ascending month order; they are applied as given".into(),
        );
    }
    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: both methods produce the same payments".into());
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::plan::PrepaymentMethod;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn reference_input(method: RepaymentMethod) -> RepaymentPlanInput {
        RepaymentPlanInput {
            terms: LoanTerms::new(dec!(1_100_000), dec!(20), dec!(3.15)),
            repayment_method: method,
        }
    }

    #[test]
    fn test_rows_number_months_within_years() {
        let schedule = vec![MonthlyPayment::new(dec!(100), dec!(1)); 14];
        let rows = schedule_rows(dec!(1400), &schedule);
        assert_eq!((rows[0].year, rows[0].month_of_year), (1, 1));
        assert_eq!((rows[11].year, rows[11].month_of_year), (1, 12));
        assert_eq!((rows[12].year, rows[12].month_of_year), (2, 1));
        assert_eq!(rows[13].month, 14);
    }

    #[test]
    fn test_rows_carry_running_balance() {
        let schedule = vec![
            MonthlyPayment::new(dec!(400), dec!(10)),
            MonthlyPayment::new(dec!(600), dec!(5)),
        ];
        let rows = schedule_rows(dec!(1000), &schedule);
        assert_eq!(rows[0].remaining_principal, dec!(600));
        assert_eq!(rows[1].remaining_principal, dec!(0));
        assert_eq!(rows[0].total_payment, dec!(410));
    }

    #[test]
    fn test_plan_without_prepayments() {
        let result = build_repayment_plan(&reference_input(
            RepaymentMethod::EqualPrincipalAndInterest,
        ))
        .unwrap();
        let summary = &result.result.summary;

        assert_eq!(summary.months, 240);
        assert_eq!(summary.interest_saved, Decimal::ZERO);
        assert_eq!(summary.total_prepaid, Decimal::ZERO);
        assert!((summary.total_principal - dec!(1_100_000)).abs() < dec!(0.000001));
        assert_eq!(summary.first_payment.round_dp(2), dec!(6183.50));
        assert_eq!(
            summary.total_repayment,
            summary.total_principal + summary.total_interest
        );
        assert!(result.warnings.is_empty());
        assert_eq!(result.result.schedule.len(), 240);
    }

    #[test]
    fn test_prepayment_saves_interest() {
        let mut input = reference_input(RepaymentMethod::EqualPrincipal);
        input.terms = input
            .terms
            .with_prepayment(120, dec!(500_000), PrepaymentMethod::ReduceDuration);
        let result = build_repayment_plan(&input).unwrap();
        let summary = &result.result.summary;

        assert_eq!(summary.months, 131);
        assert_eq!(summary.total_prepaid, dec!(500_000));
        assert!(summary.interest_saved > Decimal::ZERO);
        // 347,943.75 without the lump sum
        assert_eq!(
            (summary.interest_saved + summary.total_interest).round_dp(2),
            dec!(347943.75)
        );
        assert_eq!(summary.max_payment, result.result.schedule[119].total_payment);
    }

    #[test]
    fn test_unordered_prepayments_warn() {
        let mut input = reference_input(RepaymentMethod::EqualPrincipal);
        input.terms = input
            .terms
            .with_prepayment(60, dec!(10_000), PrepaymentMethod::ReduceAmount)
            .with_prepayment(24, dec!(10_000), PrepaymentMethod::ReduceAmount);
        let result = build_repayment_plan(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_equal_principal_pays_less_interest() {
        let terms = LoanTerms::new(dec!(1_100_000), dec!(20), dec!(3.15));
        let result = compare_repayment_methods(&terms).unwrap();
        let cmp = &result.result;

        assert_eq!(cmp.lower_interest_method, RepaymentMethod::EqualPrincipal);
        assert!(cmp.interest_difference > Decimal::ZERO);
        assert!(
            cmp.equal_principal.first_payment > cmp.equal_principal_and_interest.first_payment
        );
    }

    #[test]
    fn test_zero_rate_comparison_warns() {
        let terms = LoanTerms::new(dec!(120_000), dec!(10), dec!(0));
        let result = compare_repayment_methods(&terms).unwrap();
        assert_eq!(result.result.interest_difference, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_input_deserializes_flat() {
        let json = r#"{
            "principal": "1100000",
            "duration_years": "20",
            "annual_rate_percent": "3.15",
            "repayment_method": "equal_principal_and_interest",
            "prepayments": [
                {"month": 120, "amount": "500000", "method": "reduce_amount"}
            ]
        }"#;
        let input: RepaymentPlanInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.repayment_method, RepaymentMethod::EqualPrincipalAndInterest);
        assert_eq!(input.terms.prepayments[0].method, PrepaymentMethod::ReduceAmount);
        assert_eq!(input.terms.principal, dec!(1_100_000));
    }
}
