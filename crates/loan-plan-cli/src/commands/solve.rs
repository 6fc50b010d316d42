use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_plan_core::amortization::solver::{self, SolverInput};

/// Give exactly three of the four values; the fourth is solved for.
#[derive(Args)]
pub struct SolveArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Duration in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Level monthly payment (principal + interest)
    #[arg(long)]
    pub payment: Option<Decimal>,
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = SolverInput::from_known(args.principal, args.months, args.rate, args.payment)?;
    let solved = solver::solve(&request)?;
    Ok(serde_json::json!({
        "result": serde_json::to_value(solved)?,
        "solved_for": request.unknown(),
    }))
}
