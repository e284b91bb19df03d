//! Per-snapshot volatility surface.

use super::{FlatVol, GridVolSurface, VolPoint, VolatilitySurface};
use crate::types::InterpolationError;

/// Volatility used when a snapshot carries no usable observation.
pub const FALLBACK_VOLATILITY: f64 = 0.2;

/// Volatility surface of one option chain snapshot.
///
/// Either a grid built from the snapshot's observations, or a constant
/// surface when there were none.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{SnapshotSurface, VolPoint, VolatilitySurface};
///
/// let empty = SnapshotSurface::from_points(&[]).unwrap();
/// assert!(empty.is_fallback());
/// assert_eq!(empty.lookup(0.5, 100.0), 0.2);
///
/// let surface = SnapshotSurface::from_points(&[VolPoint::new(0.5, 100.0, 0.3)]).unwrap();
/// assert!(!surface.is_fallback());
/// assert!((surface.lookup(0.5, 100.0) - 0.3).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub enum SnapshotSurface {
    /// Interpolated grid over the observed strikes and expiries
    Grid(GridVolSurface<f64>),
    /// Constant volatility
    Flat(FlatVol<f64>),
}

impl SnapshotSurface {
    /// Constant surface at `sigma`.
    #[inline]
    pub fn flat(sigma: f64) -> Self {
        SnapshotSurface::Flat(FlatVol::new(sigma))
    }

    /// Constant surface at [`FALLBACK_VOLATILITY`].
    #[inline]
    pub fn fallback() -> Self {
        Self::flat(FALLBACK_VOLATILITY)
    }

    /// Builds a grid surface, or the fallback surface when `points` is empty.
    pub fn from_points(points: &[VolPoint<f64>]) -> Result<Self, InterpolationError> {
        if points.is_empty() {
            return Ok(Self::fallback());
        }
        GridVolSurface::from_points(points).map(SnapshotSurface::Grid)
    }

    /// Whether this is a constant surface.
    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self, SnapshotSurface::Flat(_))
    }
}

impl VolatilitySurface<f64> for SnapshotSurface {
    #[inline]
    fn lookup(&self, expiry: f64, strike: f64) -> f64 {
        match self {
            SnapshotSurface::Grid(grid) => grid.lookup(expiry, strike),
            SnapshotSurface::Flat(flat) => flat.lookup(expiry, strike),
        }
    }

    fn strike_domain(&self) -> (f64, f64) {
        match self {
            SnapshotSurface::Grid(grid) => grid.strike_domain(),
            SnapshotSurface::Flat(flat) => flat.strike_domain(),
        }
    }

    fn expiry_domain(&self) -> (f64, f64) {
        match self {
            SnapshotSurface::Grid(grid) => grid.expiry_domain(),
            SnapshotSurface::Flat(flat) => flat.expiry_domain(),
        }
    }
}

impl From<GridVolSurface<f64>> for SnapshotSurface {
    fn from(grid: GridVolSurface<f64>) -> Self {
        SnapshotSurface::Grid(grid)
    }
}
