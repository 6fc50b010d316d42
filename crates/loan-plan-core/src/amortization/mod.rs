//! Loan amortization: the level-payment solver, the two repayment
//! strategies, prepayment splicing and the repayment-plan report.
//!
//! All math uses `rust_decimal::Decimal`. The monthly rate is always derived
//! from the annual percentage on the spot (`annual / 12 / 100`) and never
//! stored alongside it.

pub mod equal_payment;
pub mod equal_principal;
pub mod plan;
pub mod report;
pub mod solver;

pub use plan::{
    compute_schedule, AmortizationStrategy, LoanTerms, MonthlyPayment, Prepayment,
    PrepaymentMethod, RepaymentMethod,
};
pub use solver::{solve, SolvedTerms, SolverInput};
