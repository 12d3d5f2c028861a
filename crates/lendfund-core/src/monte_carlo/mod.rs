//! Monte Carlo machinery for portfolio risk, gated behind the `simulation`
//! feature.

pub mod simulation;
