//! Loan-level analytics: cash flow schedules and whole-deal economics.

pub mod deal;
pub mod schedule;
