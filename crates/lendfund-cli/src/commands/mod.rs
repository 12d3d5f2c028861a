pub mod lending;
pub mod monte_carlo;
pub mod portfolio;
pub mod time_value;
