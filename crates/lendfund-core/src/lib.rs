pub mod error;
pub mod irr;
pub mod time_value;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "simulation")]
pub mod monte_carlo;

#[cfg(feature = "ratios")]
pub mod portfolio;

pub use error::LendFundError;
pub use types::*;

/// Standard result type for all fund analytics operations
pub type LendFundResult<T> = Result<T, LendFundError>;
