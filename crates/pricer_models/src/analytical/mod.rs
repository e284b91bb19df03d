//! Analytical pricing formulas for European options.
//!
//! This module provides closed-form solutions for option pricing:
//! - Black-Scholes price with analytical Greeks (Delta, Gamma, Theta, Vega, Rho)
//! - Standard normal CDF and PDF
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`**: `f64` in the engine, `f32` where precision allows
//! - **Total**: degenerate inputs take a closed-form branch instead of failing
//! - **Numerical Stability**: erfc-based CDF with exact tail saturation

pub mod black_scholes;
pub mod distributions;

// Re-export main types at module level
pub use black_scholes::{price_and_greeks, BlackScholes, GreeksResult, OptionSide};
pub use distributions::{norm_cdf, norm_pdf};
