//! # pricer_core: Foundation for the Realtime Greeks Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core serves as the bottom layer of the workspace, providing:
//! - Error types: `PricingError`, `DateError`, `InterpolationError` (`types::error`)
//! - Time types: `Date`, `ObservationTime`, `time_to_expiry` (`types::time`)
//! - Bilinear grid interpolation (`math::interpolators`)
//! - Volatility surfaces: `FlatVol`, `GridVolSurface`, `SnapshotSurface` (`market_data::surfaces`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Date arithmetic and timestamp parsing
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::market_data::surfaces::{SnapshotSurface, VolatilitySurface};
//! use pricer_core::types::{time_to_expiry, Date, ObservationTime};
//!
//! let observed = ObservationTime::parse("2025-08-25T16:50:00Z").unwrap();
//! let expiry = Date::from_ymd(2025, 8, 28).unwrap();
//! let t = time_to_expiry(observed.date(), expiry);
//! assert!((t - 3.0 / 365.0).abs() < 1e-12);
//!
//! let surface = SnapshotSurface::flat(0.2);
//! assert_eq!(surface.lookup(t, 24900.0), 0.2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for `Date` and error types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
