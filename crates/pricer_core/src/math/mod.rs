//! Mathematical building blocks.
//!
//! - [`interpolators`]: Grid interpolation used by the volatility surfaces

pub mod interpolators;
