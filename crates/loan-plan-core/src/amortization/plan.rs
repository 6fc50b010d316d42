//! Loan terms, monthly payment records and the prepayment splicing engine.
//!
//! A schedule starts as the base schedule of the selected repayment method
//! over the full stated duration. Each prepayment is then applied in the
//! order given, against the schedule produced by the previous one:
//!
//! 1. the schedule is cut after the prepayment month, remembering the
//!    record that was due the month after;
//! 2. the lump sum is added to the principal of the last retained month;
//! 3. a fresh tail is generated for the remaining principal, either running
//!    to the loan's stated end month (`ReduceAmount`) or over a shorter
//!    duration that keeps the remembered payment (`ReduceDuration`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::equal_payment::EqualPaymentStrategy;
use super::equal_principal::EqualPrincipalStrategy;
use crate::error::LoanPlanError;
use crate::types::{Money, Months, Rate};
use crate::LoanPlanResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// How a loan is repaid month to month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// Same principal every month; total payment declines.
    EqualPrincipal,
    /// Same total every month; principal share grows.
    EqualPrincipalAndInterest,
}

/// What a prepayment buys the borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PrepaymentMethod {
    /// Keep roughly the same monthly payment and finish earlier.
    ReduceDuration,
    /// Keep the end date and lower the monthly payment.
    ReduceAmount,
}

/// A lump-sum payment made on top of the scheduled payment of `month`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prepayment {
    /// 1-based month of the schedule the lump sum is paid with.
    pub month: Months,
    pub amount: Money,
    pub method: PrepaymentMethod,
}

/// Loan terms. Prepayments must be in ascending month order; they are
/// applied as given and never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub duration_years: Decimal,
    pub annual_rate_percent: Rate,
    #[serde(default)]
    pub prepayments: Vec<Prepayment>,
}

/// One month of a repayment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPayment {
    pub principal_amount: Money,
    pub interest_amount: Money,
}

impl MonthlyPayment {
    pub fn new(principal_amount: Money, interest_amount: Money) -> Self {
        Self {
            principal_amount,
            interest_amount,
        }
    }

    pub fn total(&self) -> Money {
        self.principal_amount + self.interest_amount
    }
}

/// A repayment method's schedule generator.
pub trait AmortizationStrategy {
    /// Schedule repaying `principal` in exactly `duration_in_months` months.
    fn base_schedule(
        &self,
        principal: Money,
        duration_in_months: Months,
        annual_rate_percent: Rate,
    ) -> LoanPlanResult<Vec<MonthlyPayment>>;

    /// Months needed to repay `remaining_principal` after a `ReduceDuration`
    /// prepayment, using the record that was scheduled next as reference.
    fn duration_after_prepayment(
        &self,
        remaining_principal: Money,
        next_scheduled: &MonthlyPayment,
        annual_rate_percent: Rate,
    ) -> LoanPlanResult<Months>;
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl FromStr for RepaymentMethod {
    type Err = LoanPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal_principal" => Ok(RepaymentMethod::EqualPrincipal),
            "equal_principal_and_interest" => Ok(RepaymentMethod::EqualPrincipalAndInterest),
            other => Err(LoanPlanError::InvalidInput {
                field: "repayment_method".into(),
                reason: format!(
                    "unknown method '{other}', expected equal_principal or \
                     equal_principal_and_interest"
                ),
            }),
        }
    }
}

impl fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepaymentMethod::EqualPrincipal => write!(f, "equal_principal"),
            RepaymentMethod::EqualPrincipalAndInterest => {
                write!(f, "equal_principal_and_interest")
            }
        }
    }
}

impl FromStr for PrepaymentMethod {
    type Err = LoanPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reduce_duration" => Ok(PrepaymentMethod::ReduceDuration),
            "reduce_amount" => Ok(PrepaymentMethod::ReduceAmount),
            other => Err(LoanPlanError::InvalidPrepaymentMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for PrepaymentMethod {
    type Error = LoanPlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PrepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepaymentMethod::ReduceDuration => write!(f, "reduce_duration"),
            PrepaymentMethod::ReduceAmount => write!(f, "reduce_amount"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loan terms
// ---------------------------------------------------------------------------

impl LoanTerms {
    pub fn new(principal: Money, duration_years: Decimal, annual_rate_percent: Rate) -> Self {
        Self {
            principal,
            duration_years,
            annual_rate_percent,
            prepayments: Vec::new(),
        }
    }

    pub fn with_prepayment(mut self, month: Months, amount: Money, method: PrepaymentMethod) -> Self {
        self.prepayments.push(Prepayment {
            month,
            amount,
            method,
        });
        self
    }

    /// The same loan with no prepayments.
    pub fn without_prepayments(&self) -> Self {
        Self {
            prepayments: Vec::new(),
            ..self.clone()
        }
    }

    /// Stated duration in whole months.
    pub fn duration_in_months(&self) -> LoanPlanResult<Months> {
        let months = self.duration_years * MONTHS_PER_YEAR;
        if months <= Decimal::ZERO || !months.fract().is_zero() {
            return Err(LoanPlanError::InvalidInput {
                field: "duration_years".into(),
                reason: format!("{} years is not a positive whole number of months", self.duration_years),
            });
        }
        months.to_u32().ok_or_else(|| LoanPlanError::InvalidInput {
            field: "duration_years".into(),
            reason: format!("{months} months is too long"),
        })
    }

    pub fn validate(&self) -> LoanPlanResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanPlanError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanPlanError::InvalidInput {
                field: "annual_rate_percent".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        self.duration_in_months()?;

        for (i, prepayment) in self.prepayments.iter().enumerate() {
            if prepayment.month == 0 {
                return Err(LoanPlanError::InvalidInput {
                    field: format!("prepayments[{i}].month"),
                    reason: "Months are 1-based".into(),
                });
            }
            if prepayment.amount <= Decimal::ZERO {
                return Err(LoanPlanError::InvalidInput {
                    field: format!("prepayments[{i}].amount"),
                    reason: "Prepayment amount must be positive".into(),
                });
            }
        }
        Ok(())
    }

    /// True when prepayment months are non-decreasing.
    pub fn prepayments_in_order(&self) -> bool {
        self.prepayments.windows(2).all(|w| w[0].month <= w[1].month)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Month-by-month schedule for `terms` under `method`, with every
/// prepayment spliced in.
pub fn compute_schedule(
    terms: &LoanTerms,
    method: RepaymentMethod,
) -> LoanPlanResult<Vec<MonthlyPayment>> {
    match method {
        RepaymentMethod::EqualPrincipal => compute_schedule_with(&EqualPrincipalStrategy, terms),
        RepaymentMethod::EqualPrincipalAndInterest => {
            compute_schedule_with(&EqualPaymentStrategy, terms)
        }
    }
}

/// Same as [`compute_schedule`] for any strategy implementation.
pub fn compute_schedule_with<S: AmortizationStrategy + ?Sized>(
    strategy: &S,
    terms: &LoanTerms,
) -> LoanPlanResult<Vec<MonthlyPayment>> {
    terms.validate()?;

    let duration = terms.duration_in_months()?;
    let mut schedule = strategy.base_schedule(terms.principal, duration, terms.annual_rate_percent)?;

    for prepayment in &terms.prepayments {
        schedule = apply_prepayment(strategy, terms, schedule, prepayment)?;
    }

    Ok(schedule)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn apply_prepayment<S: AmortizationStrategy + ?Sized>(
    strategy: &S,
    terms: &LoanTerms,
    mut schedule: Vec<MonthlyPayment>,
    prepayment: &Prepayment,
) -> LoanPlanResult<Vec<MonthlyPayment>> {
    let schedule_length = schedule.len();
    let retained = prepayment.month as usize;
    if retained >= schedule_length {
        return Err(LoanPlanError::PrepaymentBeyondScheduleEnd {
            month: prepayment.month,
            schedule_length,
        });
    }

    // Dropped from the output, but ReduceDuration measures against it.
    let next_scheduled = schedule[retained];
    schedule.truncate(retained);

    let last = schedule
        .last_mut()
        .ok_or_else(|| LoanPlanError::InvalidInput {
            field: "prepayments.month".into(),
            reason: "Months are 1-based".into(),
        })?;
    last.principal_amount += prepayment.amount;

    let repaid: Money = schedule.iter().map(|m| m.principal_amount).sum();
    let remaining_principal = terms.principal - repaid;
    if remaining_principal < Decimal::ZERO {
        return Err(LoanPlanError::PrepaymentExceedsRemainingPrincipal {
            month: prepayment.month,
            shortfall: -remaining_principal,
        });
    }

    let remaining_months = match prepayment.method {
        PrepaymentMethod::ReduceAmount => terms.duration_in_months()? - prepayment.month,
        PrepaymentMethod::ReduceDuration => strategy.duration_after_prepayment(
            remaining_principal,
            &next_scheduled,
            terms.annual_rate_percent,
        )?,
    };

    log::debug!(
        "prepayment of {} at month {} ({}): {} left over {} months",
        prepayment.amount,
        prepayment.month,
        prepayment.method,
        remaining_principal,
        remaining_months
    );

    // Nothing left to amortize once the lump sum clears the balance.
    if remaining_principal.is_zero() {
        return Ok(schedule);
    }

    // A sub-cent remainder still takes a final month to repay.
    let tail = strategy.base_schedule(
        remaining_principal,
        remaining_months.max(1),
        terms.annual_rate_percent,
    )?;
    schedule.extend(tail);
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_loan() -> LoanTerms {
        LoanTerms::new(dec!(1_100_000), dec!(20), dec!(3.15))
    }

    #[test]
    fn test_duration_in_months() {
        assert_eq!(reference_loan().duration_in_months().unwrap(), 240);
        let half_year = LoanTerms::new(dec!(1000), dec!(0.5), dec!(3));
        assert_eq!(half_year.duration_in_months().unwrap(), 6);
    }

    #[test]
    fn test_fractional_month_duration_rejected() {
        let terms = LoanTerms::new(dec!(1000), dec!(1.01), dec!(3));
        assert!(matches!(
            terms.duration_in_months(),
            Err(LoanPlanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_terms() {
        let zero_principal = LoanTerms::new(dec!(0), dec!(10), dec!(3));
        assert!(zero_principal.validate().is_err());

        let negative_rate = LoanTerms::new(dec!(1000), dec!(10), dec!(-0.5));
        assert!(negative_rate.validate().is_err());

        let month_zero = reference_loan().with_prepayment(0, dec!(10), PrepaymentMethod::ReduceAmount);
        assert!(month_zero.validate().is_err());

        let zero_amount =
            reference_loan().with_prepayment(12, dec!(0), PrepaymentMethod::ReduceAmount);
        assert!(zero_amount.validate().is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "equal_principal".parse::<RepaymentMethod>().unwrap(),
            RepaymentMethod::EqualPrincipal
        );
        assert_eq!(
            "reduce_amount".parse::<PrepaymentMethod>().unwrap(),
            PrepaymentMethod::ReduceAmount
        );
        assert!(matches!(
            "reduce_interest".parse::<PrepaymentMethod>(),
            Err(LoanPlanError::InvalidPrepaymentMethod(_))
        ));
        assert!(matches!(
            "balloon".parse::<RepaymentMethod>(),
            Err(LoanPlanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_method_display_round_trips() {
        for method in [PrepaymentMethod::ReduceDuration, PrepaymentMethod::ReduceAmount] {
            assert_eq!(method.to_string().parse::<PrepaymentMethod>().unwrap(), method);
        }
        for method in [
            RepaymentMethod::EqualPrincipal,
            RepaymentMethod::EqualPrincipalAndInterest,
        ] {
            assert_eq!(method.to_string().parse::<RepaymentMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_unknown_prepayment_method_rejected_on_deserialize() {
        let json = r#"{"month": 12, "amount": "1000", "method": "skip_a_month"}"#;
        let err = serde_json::from_str::<Prepayment>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid prepayment method"));
    }

    #[test]
    fn test_no_prepayments_is_base_schedule() {
        let terms = reference_loan();
        let schedule = compute_schedule(&terms, RepaymentMethod::EqualPrincipal).unwrap();
        let base = EqualPrincipalStrategy
            .base_schedule(dec!(1_100_000), 240, dec!(3.15))
            .unwrap();
        assert_eq!(schedule, base);
    }

    #[test]
    fn test_lump_sum_lands_on_last_retained_month() {
        let terms = reference_loan().with_prepayment(120, dec!(500_000), PrepaymentMethod::ReduceAmount);
        let base = compute_schedule(&reference_loan(), RepaymentMethod::EqualPrincipalAndInterest).unwrap();
        let spliced = compute_schedule(&terms, RepaymentMethod::EqualPrincipalAndInterest).unwrap();

        assert_eq!(&spliced[..119], &base[..119]);
        assert_eq!(
            spliced[119].principal_amount,
            base[119].principal_amount + dec!(500_000)
        );
        assert_eq!(spliced[119].interest_amount, base[119].interest_amount);
    }

    #[test]
    fn test_prepayment_at_schedule_end_rejected() {
        let terms = reference_loan().with_prepayment(240, dec!(1000), PrepaymentMethod::ReduceAmount);
        match compute_schedule(&terms, RepaymentMethod::EqualPrincipal).unwrap_err() {
            LoanPlanError::PrepaymentBeyondScheduleEnd {
                month,
                schedule_length,
            } => {
                assert_eq!(month, 240);
                assert_eq!(schedule_length, 240);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_earlier_prepayment_shrinks_valid_range() {
        // The first prepayment cuts the schedule to 131 months.
        let terms = reference_loan()
            .with_prepayment(120, dec!(500_000), PrepaymentMethod::ReduceDuration)
            .with_prepayment(200, dec!(1000), PrepaymentMethod::ReduceAmount);
        assert!(matches!(
            compute_schedule(&terms, RepaymentMethod::EqualPrincipal),
            Err(LoanPlanError::PrepaymentBeyondScheduleEnd {
                month: 200,
                schedule_length: 131
            })
        ));
    }

    #[test]
    fn test_prepayment_exceeding_balance_rejected() {
        let terms = reference_loan().with_prepayment(120, dec!(600_000), PrepaymentMethod::ReduceDuration);
        match compute_schedule(&terms, RepaymentMethod::EqualPrincipal).unwrap_err() {
            LoanPlanError::PrepaymentExceedsRemainingPrincipal { month, shortfall } => {
                assert_eq!(month, 120);
                // 120 months repay 550,000 on schedule, leaving 550,000
                assert!((shortfall - dec!(50_000)).abs() < dec!(0.000001));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_prepayment_clearing_balance_ends_schedule() {
        let terms = LoanTerms::new(dec!(1200), dec!(1), dec!(0)).with_prepayment(
            6,
            dec!(600),
            PrepaymentMethod::ReduceAmount,
        );
        let schedule = compute_schedule(&terms, RepaymentMethod::EqualPrincipal).unwrap();
        assert_eq!(schedule.len(), 6);
        assert_eq!(schedule[5].principal_amount, dec!(700));
    }

    #[test]
    fn test_sub_cent_remainder_gets_a_final_month() {
        // 0.004 left rounds to 0.00 in the equal-principal duration formula
        let terms = LoanTerms::new(dec!(1200), dec!(1), dec!(0)).with_prepayment(
            6,
            dec!(599.996),
            PrepaymentMethod::ReduceDuration,
        );
        let schedule = compute_schedule(&terms, RepaymentMethod::EqualPrincipal).unwrap();
        assert_eq!(schedule.len(), 7);
        assert_eq!(schedule[6].principal_amount, dec!(0.004));
        let repaid: Money = schedule.iter().map(|m| m.principal_amount).sum();
        assert_eq!(repaid, dec!(1200));
    }

    #[test]
    fn test_reduce_amount_runs_to_stated_end_after_reduce_duration() {
        let terms = reference_loan()
            .with_prepayment(60, dec!(200_000), PrepaymentMethod::ReduceDuration)
            .with_prepayment(100, dec!(100_000), PrepaymentMethod::ReduceAmount);
        let schedule = compute_schedule(&terms, RepaymentMethod::EqualPrincipalAndInterest).unwrap();
        assert_eq!(schedule.len(), 240);
    }

    #[test]
    fn test_prepayments_in_order() {
        let ordered = reference_loan()
            .with_prepayment(12, dec!(1000), PrepaymentMethod::ReduceAmount)
            .with_prepayment(24, dec!(1000), PrepaymentMethod::ReduceAmount);
        assert!(ordered.prepayments_in_order());

        let unordered = reference_loan()
            .with_prepayment(24, dec!(1000), PrepaymentMethod::ReduceAmount)
            .with_prepayment(12, dec!(1000), PrepaymentMethod::ReduceAmount);
        assert!(!unordered.prepayments_in_order());
    }
}
