//! Market data structures for option pricing.
//!
//! # Components
//!
//! - [`surfaces`]: Volatility surface trait and implementations (FlatVol, GridVolSurface,
//!   SnapshotSurface)
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::{SnapshotSurface, VolPoint, VolatilitySurface};
//!
//! let points = [
//!     VolPoint::new(0.25, 95.0, 0.24),
//!     VolPoint::new(0.25, 105.0, 0.20),
//! ];
//! let surface = SnapshotSurface::from_points(&points).unwrap();
//! assert!((surface.lookup(0.25, 100.0) - 0.22).abs() < 1e-12);
//! ```

pub mod surfaces;

// Re-export commonly used types
pub use surfaces::{
    FlatVol, GridVolSurface, SnapshotSurface, VolPoint, VolatilitySurface, FALLBACK_VOLATILITY,
};
