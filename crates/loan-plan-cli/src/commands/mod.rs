pub mod schedule;
pub mod solve;
