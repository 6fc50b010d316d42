use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_plan_core::amortization::report::{self, RepaymentPlanInput};
use loan_plan_core::amortization::{LoanTerms, RepaymentMethod};

use crate::input;

/// Arguments for a repayment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (loan terms, repayment_method, prepayments)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Loan duration in years (e.g. 20, or 2.5 for 30 months)
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 3.15)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// equal_principal or equal_principal_and_interest
    #[arg(long, default_value = "equal_principal_and_interest")]
    pub method: RepaymentMethod,
}

/// Arguments for a repayment method comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file with loan terms and prepayments
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Loan duration in years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan_input: RepaymentPlanInput = match input::read_input(args.input.as_deref())? {
        Some(value) => value,
        None => RepaymentPlanInput {
            terms: terms_from_flags(args.principal, args.years, args.rate)?,
            repayment_method: args.method,
        },
    };
    let result = report::build_repayment_plan(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match input::read_input(args.input.as_deref())? {
        Some(value) => value,
        None => terms_from_flags(args.principal, args.years, args.rate)?,
    };
    let result = report::compare_repayment_methods(&terms)?;
    Ok(serde_json::to_value(result)?)
}

fn terms_from_flags(
    principal: Option<Decimal>,
    years: Option<Decimal>,
    rate: Option<Decimal>,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    Ok(LoanTerms::new(
        principal.ok_or("--principal is required (or provide --input)")?,
        years.ok_or("--years is required (or provide --input)")?,
        rate.ok_or("--rate is required (or provide --input)")?,
    ))
}
