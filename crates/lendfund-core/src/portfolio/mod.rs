//! Portfolio-level performance analytics, gated behind the `ratios` feature.

pub mod ratios;
pub mod returns;
