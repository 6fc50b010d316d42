pub mod amortization;
pub mod error;
pub mod types;

pub use error::LoanPlanError;
pub use types::*;

/// Standard result type for all loan-plan operations
pub type LoanPlanResult<T> = Result<T, LoanPlanError>;
