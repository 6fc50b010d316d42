use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanPlanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid solver input: {0}")]
    InvalidSolverInput(String),

    #[error("Non-amortizing payment: monthly total {monthly_total} does not exceed interest due {interest_due}")]
    NonAmortizingPayment {
        monthly_total: Decimal,
        interest_due: Decimal,
    },

    #[error("Prepayment at month {month} is beyond the schedule end ({schedule_length} months)")]
    PrepaymentBeyondScheduleEnd { month: u32, schedule_length: usize },

    #[error("Prepayment at month {month} exceeds remaining principal (shortfall: {shortfall})")]
    PrepaymentExceedsRemainingPrincipal { month: u32, shortfall: Decimal },

    #[error("Invalid prepayment method: {0}")]
    InvalidPrepaymentMethod(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanPlanError {
    fn from(e: serde_json::Error) -> Self {
        LoanPlanError::SerializationError(e.to_string())
    }
}
