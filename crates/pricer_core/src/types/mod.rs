//! Core time and error types.
//!
//! This module provides:
//! - `time`: `Date`, `ObservationTime` and the Act/365 time-to-expiry used by the engine
//! - `error`: Structured error types for pricing, date and interpolation operations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Date`], [`ObservationTime`], [`time_to_expiry`], [`TIME_EPSILON`] from `time`
//! - [`PricingError`], [`DateError`], [`InterpolationError`] from `error`

pub mod error;
pub mod time;

// Re-export commonly used types at module level
pub use error::{DateError, InterpolationError, PricingError};
pub use time::{time_to_expiry, Date, ObservationTime, DAYS_PER_YEAR, TIME_EPSILON};
