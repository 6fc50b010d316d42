//! Level-payment amortization solver.
//!
//! Relates the four quantities of a level-payment loan: principal, duration
//! in months, annual rate (percent) and the constant monthly total. Given any
//! three, the fourth is derived in closed form:
//!
//! ```text
//! M = P * r(1+r)^n / ((1+r)^n - 1)
//! n = ln(M / (M - rP)) / ln(1 + r)
//! P = M * ((1+r)^n - 1) / (r(1+r)^n)
//! ```
//!
//! where `r` is the monthly rate. Solving for the rate has no closed form and
//! is rejected.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanPlanError;
use crate::types::{Money, Months, Rate};
use crate::LoanPlanResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT_DIVISOR: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Solver request, tagged by the single unknown. The other three values are
/// carried as fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unknown", rename_all = "snake_case")]
pub enum SolverInput {
    MonthlyTotal {
        principal: Money,
        duration_in_months: Months,
        annual_rate_percent: Rate,
    },
    DurationInMonths {
        principal: Money,
        annual_rate_percent: Rate,
        monthly_total: Money,
    },
    Principal {
        duration_in_months: Months,
        annual_rate_percent: Rate,
        monthly_total: Money,
    },
    /// Recognised so callers can ask, but always rejected.
    AnnualRate {
        principal: Money,
        duration_in_months: Months,
        monthly_total: Money,
    },
}

/// All four amortization values once the unknown has been solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedTerms {
    pub principal: Money,
    /// Fractional when solved for; callers round up to whole months.
    pub duration_in_months: Decimal,
    pub annual_rate_percent: Rate,
    pub monthly_total: Money,
}

impl SolverInput {
    /// Build a tagged request from four optional values, exactly three of
    /// which must be present.
    pub fn from_known(
        principal: Option<Money>,
        duration_in_months: Option<Months>,
        annual_rate_percent: Option<Rate>,
        monthly_total: Option<Money>,
    ) -> LoanPlanResult<Self> {
        match (principal, duration_in_months, annual_rate_percent, monthly_total) {
            (Some(principal), Some(duration_in_months), Some(annual_rate_percent), None) => {
                Ok(SolverInput::MonthlyTotal {
                    principal,
                    duration_in_months,
                    annual_rate_percent,
                })
            }
            (Some(principal), None, Some(annual_rate_percent), Some(monthly_total)) => {
                Ok(SolverInput::DurationInMonths {
                    principal,
                    annual_rate_percent,
                    monthly_total,
                })
            }
            (None, Some(duration_in_months), Some(annual_rate_percent), Some(monthly_total)) => {
                Ok(SolverInput::Principal {
                    duration_in_months,
                    annual_rate_percent,
                    monthly_total,
                })
            }
            (Some(principal), Some(duration_in_months), None, Some(monthly_total)) => {
                Ok(SolverInput::AnnualRate {
                    principal,
                    duration_in_months,
                    monthly_total,
                })
            }
            _ => {
                let provided = [
                    principal.is_some(),
                    duration_in_months.is_some(),
                    annual_rate_percent.is_some(),
                    monthly_total.is_some(),
                ]
                .iter()
                .filter(|known| **known)
                .count();
                Err(LoanPlanError::InvalidSolverInput(format!(
                    "exactly three of principal, duration_in_months, annual_rate_percent \
                     and monthly_total are required, got {provided}"
                )))
            }
        }
    }

    /// Field name of the value this request solves for.
    pub fn unknown(&self) -> &'static str {
        match self {
            SolverInput::MonthlyTotal { .. } => "monthly_total",
            SolverInput::DurationInMonths { .. } => "duration_in_months",
            SolverInput::Principal { .. } => "principal",
            SolverInput::AnnualRate { .. } => "annual_rate_percent",
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly rate as a decimal fraction: `annual_rate_percent / 12 / 100`.
pub fn monthly_rate(annual_rate_percent: Rate) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT_DIVISOR
}

/// Solve for whichever value the request leaves unknown.
pub fn solve(input: &SolverInput) -> LoanPlanResult<SolvedTerms> {
    match *input {
        SolverInput::MonthlyTotal {
            principal,
            duration_in_months,
            annual_rate_percent,
        } => Ok(SolvedTerms {
            principal,
            duration_in_months: Decimal::from(duration_in_months),
            annual_rate_percent,
            monthly_total: level_monthly_payment(
                principal,
                duration_in_months,
                annual_rate_percent,
            )?,
        }),
        SolverInput::DurationInMonths {
            principal,
            annual_rate_percent,
            monthly_total,
        } => Ok(SolvedTerms {
            principal,
            duration_in_months: months_to_repay(principal, annual_rate_percent, monthly_total)?,
            annual_rate_percent,
            monthly_total,
        }),
        SolverInput::Principal {
            duration_in_months,
            annual_rate_percent,
            monthly_total,
        } => Ok(SolvedTerms {
            principal: affordable_principal(duration_in_months, annual_rate_percent, monthly_total)?,
            duration_in_months: Decimal::from(duration_in_months),
            annual_rate_percent,
            monthly_total,
        }),
        SolverInput::AnnualRate { .. } => Err(LoanPlanError::InvalidSolverInput(
            "solving for annual_rate_percent is not supported".into(),
        )),
    }
}

/// Constant monthly total that repays `principal` over `duration_in_months`.
pub fn level_monthly_payment(
    principal: Money,
    duration_in_months: Months,
    annual_rate_percent: Rate,
) -> LoanPlanResult<Money> {
    validate_rate(annual_rate_percent)?;
    if duration_in_months == 0 {
        return Err(LoanPlanError::InvalidSolverInput(
            "duration_in_months must be > 0".into(),
        ));
    }

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return Ok(principal / Decimal::from(duration_in_months));
    }

    let growth = compound_growth(r, duration_in_months)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LoanPlanError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    Ok(principal * r * growth / denominator)
}

/// Fractional number of months for `monthly_total` to repay `principal`.
///
/// Fails with `NonAmortizingPayment` when the payment does not exceed the
/// first month's interest.
pub fn months_to_repay(
    principal: Money,
    annual_rate_percent: Rate,
    monthly_total: Money,
) -> LoanPlanResult<Decimal> {
    validate_rate(annual_rate_percent)?;

    let r = monthly_rate(annual_rate_percent);
    let interest_due = principal * r;
    if monthly_total <= interest_due || monthly_total <= Decimal::ZERO {
        return Err(LoanPlanError::NonAmortizingPayment {
            monthly_total,
            interest_due,
        });
    }

    if r.is_zero() {
        return Ok(principal / monthly_total);
    }

    let ratio = monthly_total / (monthly_total - interest_due);
    let numerator = ratio
        .checked_ln()
        .ok_or_else(|| LoanPlanError::NonAmortizingPayment {
            monthly_total,
            interest_due,
        })?;
    let denominator = (Decimal::ONE + r).checked_ln().ok_or_else(|| {
        LoanPlanError::InvalidSolverInput(format!("ln(1 + {r}) is undefined"))
    })?;
    if denominator.is_zero() {
        return Err(LoanPlanError::DivisionByZero {
            context: "ln(1 + monthly rate)".into(),
        });
    }

    let months = numerator / denominator;
    log::debug!(
        "solved duration: principal={principal} rate={annual_rate_percent}% \
         monthly_total={monthly_total} -> {months} months"
    );
    Ok(months)
}

/// Principal that `monthly_total` repays over `duration_in_months`.
pub fn affordable_principal(
    duration_in_months: Months,
    annual_rate_percent: Rate,
    monthly_total: Money,
) -> LoanPlanResult<Money> {
    validate_rate(annual_rate_percent)?;

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return Ok(monthly_total * Decimal::from(duration_in_months));
    }

    let growth = compound_growth(r, duration_in_months)?;
    Ok(monthly_total * (growth - Decimal::ONE) / (r * growth))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_rate(annual_rate_percent: Rate) -> LoanPlanResult<()> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanPlanError::InvalidSolverInput(format!(
            "annual_rate_percent must be >= 0, got {annual_rate_percent}"
        )));
    }
    Ok(())
}

/// (1 + r)^n
fn compound_growth(r: Rate, n: Months) -> LoanPlanResult<Decimal> {
    (Decimal::ONE + r).checked_powu(u64::from(n)).ok_or_else(|| {
        LoanPlanError::InvalidSolverInput(format!(
            "compound growth overflows over {n} months at monthly rate {r}"
        ))
    })
}
