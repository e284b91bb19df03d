//! Volatility surface abstractions for option pricing.
//!
//! This module provides:
//! - [`VolatilitySurface`]: Generic trait for total implied volatility lookup
//! - [`FlatVol`]: Constant volatility surface implementation
//! - [`GridVolSurface`]: Mean-filled grid surface built from scattered [`VolPoint`]s
//! - [`SnapshotSurface`]: The surface of one chain snapshot, grid or constant fallback

mod flat;
mod grid;
mod snapshot;
mod traits;

pub use flat::FlatVol;
pub use grid::{GridVolSurface, VolPoint};
pub use snapshot::{SnapshotSurface, FALLBACK_VOLATILITY};
pub use traits::VolatilitySurface;
