//! # Pricer Models (L2: Business Logic)
//!
//! Closed-form option models for the realtime Greeks engine.
//!
//! This crate provides:
//! - Black-Scholes price and Greeks for European calls and puts
//! - Standard normal distribution functions
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::analytical::{price_and_greeks, OptionSide};
//!
//! let t = 3.0 / 365.0;
//! let call = price_and_greeks(24967.75, 24900.0, t, 0.0545, 0.0737, OptionSide::Call);
//! let put = price_and_greeks(24967.75, 24900.0, t, 0.0545, 0.0737, OptionSide::Put);
//!
//! let parity = call.price - put.price - (24967.75 - 24900.0 * (-0.0545 * t).exp());
//! assert!(parity.abs() < 1e-6 * 24967.75);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
