//! Volatility surface built from sparse market observations.

use super::VolatilitySurface;
use crate::math::interpolators::BilinearInterpolator;
use crate::types::{InterpolationError, TIME_EPSILON};
use num_traits::Float;
use std::cmp::Ordering;

/// One observed implied volatility.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::VolPoint;
///
/// let point = VolPoint::new(3.0 / 365.0, 24900.0, 0.0901);
/// assert_eq!(point.strike, 24900.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolPoint<T> {
    /// Time to expiry in years
    pub expiry: T,
    /// Strike price
    pub strike: T,
    /// Observed implied volatility
    pub volatility: T,
}

impl<T> VolPoint<T> {
    /// Creates an observation.
    #[inline]
    pub fn new(expiry: T, strike: T, volatility: T) -> Self {
        Self {
            expiry,
            strike,
            volatility,
        }
    }
}

/// Grid volatility surface with mean fill.
///
/// Construction from scattered points:
/// 1. The distinct sorted expiries and strikes span a rectangular grid
/// 2. Each cell holds the average of the observations landing exactly on it
/// 3. Cells without observations take the mean of the populated cells
/// 4. Lookups interpolate bilinearly inside the observed bounding box and
///    return the fill value outside it
///
/// Query expiries are floored at [`TIME_EPSILON`].
///
/// # Grid Layout
///
/// `vols[expiry_idx][strike_idx]`, rows are expiry slices.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{GridVolSurface, VolPoint, VolatilitySurface};
///
/// let points: [VolPoint<f64>; 3] = [
///     VolPoint::new(0.1, 100.0, 0.20),
///     VolPoint::new(0.1, 110.0, 0.30),
///     VolPoint::new(0.2, 100.0, 0.40),
/// ];
/// let surface = GridVolSurface::from_points(&points).unwrap();
///
/// // (0.2, 110) had no quote and was filled with the mean
/// assert!((surface.fill_value() - 0.30).abs() < 1e-12);
/// assert!((surface.lookup(0.15, 105.0) - 0.30).abs() < 1e-12);
///
/// // Outside the observed box
/// assert_eq!(surface.lookup(1.0, 100.0), surface.fill_value());
/// ```
#[derive(Debug, Clone)]
pub struct GridVolSurface<T: Float> {
    /// Dense grid: x = expiry, y = strike
    interp: BilinearInterpolator<T>,
    /// Mean of the populated cells
    fill: T,
    /// Number of cells that carried at least one observation
    observed_cells: usize,
}

impl<T: Float> GridVolSurface<T> {
    /// Builds the surface from scattered observations.
    ///
    /// # Returns
    ///
    /// * `Ok(GridVolSurface)` - Dense surface over the observed grid
    /// * `Err(InterpolationError::InsufficientData)` - No observations
    /// * `Err(InterpolationError::InvalidInput)` - A non-finite coordinate or a
    ///   volatility that is not finite and positive
    pub fn from_points(points: &[VolPoint<T>]) -> Result<Self, InterpolationError> {
        if points.is_empty() {
            return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
        }

        for (i, p) in points.iter().enumerate() {
            if !p.expiry.is_finite() || !p.strike.is_finite() {
                return Err(InterpolationError::InvalidInput(format!(
                    "observation {} has a non-finite coordinate",
                    i
                )));
            }
            if !(p.volatility.is_finite() && p.volatility > T::zero()) {
                return Err(InterpolationError::InvalidInput(format!(
                    "observation {} volatility must be finite and positive",
                    i
                )));
            }
        }

        let expiries = sorted_distinct(points.iter().map(|p| p.expiry));
        let strikes = sorted_distinct(points.iter().map(|p| p.strike));

        let mut sums = vec![vec![T::zero(); strikes.len()]; expiries.len()];
        let mut counts = vec![vec![0usize; strikes.len()]; expiries.len()];
        for p in points {
            let i = position(&expiries, p.expiry)?;
            let j = position(&strikes, p.strike)?;
            sums[i][j] = sums[i][j] + p.volatility;
            counts[i][j] += 1;
        }

        let mut cells: Vec<Vec<Option<T>>> = Vec::with_capacity(expiries.len());
        let mut total = T::zero();
        let mut observed_cells = 0usize;
        for (sum_row, count_row) in sums.iter().zip(&counts) {
            let mut row = Vec::with_capacity(strikes.len());
            for (&sum, &count) in sum_row.iter().zip(count_row) {
                if count == 0 {
                    row.push(None);
                } else {
                    let avg = sum / from_usize(count)?;
                    total = total + avg;
                    observed_cells += 1;
                    row.push(Some(avg));
                }
            }
            cells.push(row);
        }

        let fill = total / from_usize(observed_cells)?;
        let vols: Vec<Vec<T>> = cells
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(fill)).collect())
            .collect();
        let rows: Vec<&[T]> = vols.iter().map(Vec::as_slice).collect();
        let interp = BilinearInterpolator::new(&expiries, &strikes, &rows)?;

        Ok(Self {
            interp,
            fill,
            observed_cells,
        })
    }

    /// Volatility returned for queries outside the observed box.
    #[inline]
    pub fn fill_value(&self) -> T {
        self.fill
    }

    /// Grid shape as (expiries, strikes).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.interp.xs().len(), self.interp.ys().len())
    }

    /// Number of grid cells that carried at least one observation.
    #[inline]
    pub fn observed_cells(&self) -> usize {
        self.observed_cells
    }

    /// Sorted distinct expiries of the grid.
    #[inline]
    pub fn expiries(&self) -> &[T] {
        self.interp.xs()
    }

    /// Sorted distinct strikes of the grid.
    #[inline]
    pub fn strikes(&self) -> &[T] {
        self.interp.ys()
    }
}

impl<T: Float> VolatilitySurface<T> for GridVolSurface<T> {
    fn lookup(&self, expiry: T, strike: T) -> T {
        let floor = T::from(TIME_EPSILON).unwrap_or_else(T::epsilon);
        self.interp
            .interpolate(expiry.max(floor), strike)
            .unwrap_or(self.fill)
    }

    #[inline]
    fn strike_domain(&self) -> (T, T) {
        self.interp.domain_y()
    }

    #[inline]
    fn expiry_domain(&self) -> (T, T) {
        self.interp.domain_x()
    }
}

fn sorted_distinct<T: Float>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = values.collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out.dedup();
    out
}

fn position<T: Float>(axis: &[T], value: T) -> Result<usize, InterpolationError> {
    axis.binary_search_by(|a| a.partial_cmp(&value).unwrap_or(Ordering::Equal))
        .map_err(|_| InterpolationError::InvalidInput("grid coordinate not found".to_string()))
}

fn from_usize<T: Float>(n: usize) -> Result<T, InterpolationError> {
    T::from(n).ok_or_else(|| {
        InterpolationError::InvalidInput(format!("{} not representable as float", n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sparse_surface() -> GridVolSurface<f64> {
        let points = [
            VolPoint::new(0.1, 100.0, 0.20),
            VolPoint::new(0.1, 110.0, 0.30),
            VolPoint::new(0.2, 100.0, 0.40),
        ];
        GridVolSurface::from_points(&points).unwrap()
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_from_points_empty() {
        let points: [VolPoint<f64>; 0] = [];
        assert!(matches!(
            GridVolSurface::from_points(&points),
            Err(InterpolationError::InsufficientData { got: 0, need: 1 })
        ));
    }

    #[test]
    fn test_from_points_rejects_bad_volatility() {
        for vol in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let points = [VolPoint::new(0.1, 100.0, vol)];
            assert!(matches!(
                GridVolSurface::from_points(&points),
                Err(InterpolationError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_from_points_rejects_bad_coordinates() {
        let points = [VolPoint::new(f64::NAN, 100.0, 0.2)];
        assert!(GridVolSurface::from_points(&points).is_err());
    }

    #[test]
    fn test_shape_and_mean_fill() {
        let surface = sparse_surface();
        assert_eq!(surface.shape(), (2, 2));
        assert_eq!(surface.observed_cells(), 3);
        assert_relative_eq!(surface.fill_value(), 0.30, epsilon = 1e-12);
        assert_eq!(surface.expiries(), &[0.1, 0.2]);
        assert_eq!(surface.strikes(), &[100.0, 110.0]);
    }

    #[test]
    fn test_duplicate_observations_are_averaged() {
        let points = [
            VolPoint::new(0.1, 100.0, 0.0901),
            VolPoint::new(0.1, 100.0, 0.0573),
        ];
        let surface = GridVolSurface::from_points(&points).unwrap();
        assert_eq!(surface.observed_cells(), 1);
        assert_relative_eq!(surface.lookup(0.1, 100.0), 0.0737, epsilon = 1e-12);
    }

    #[test]
    fn test_fill_is_mean_of_cells_not_points() {
        // Cell (0.1, 100) has three quotes, cell (0.1, 110) one
        let points = [
            VolPoint::new(0.1, 100.0, 0.10),
            VolPoint::new(0.1, 100.0, 0.10),
            VolPoint::new(0.1, 100.0, 0.10),
            VolPoint::new(0.1, 110.0, 0.30),
            VolPoint::new(0.2, 120.0, 0.20),
        ];
        let surface = GridVolSurface::from_points(&points).unwrap();
        assert_relative_eq!(surface.fill_value(), 0.20, epsilon = 1e-12);
    }

    // ========================================
    // Lookup Tests
    // ========================================

    #[test]
    fn test_lookup_at_nodes() {
        let surface = sparse_surface();
        assert_relative_eq!(surface.lookup(0.1, 100.0), 0.20, epsilon = 1e-12);
        assert_relative_eq!(surface.lookup(0.1, 110.0), 0.30, epsilon = 1e-12);
        assert_relative_eq!(surface.lookup(0.2, 100.0), 0.40, epsilon = 1e-12);
        // Filled node
        assert_relative_eq!(surface.lookup(0.2, 110.0), 0.30, epsilon = 1e-12);
    }

    #[test]
    fn test_lookup_interior_interpolates() {
        let surface = sparse_surface();
        assert_relative_eq!(surface.lookup(0.15, 105.0), 0.30, epsilon = 1e-12);
        assert_relative_eq!(surface.lookup(0.1, 105.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_lookup_outside_box_returns_fill() {
        let surface = sparse_surface();
        for (t, k) in [(0.05, 100.0), (0.5, 100.0), (0.1, 90.0), (0.1, 120.0)] {
            assert_eq!(surface.lookup(t, k), surface.fill_value());
        }
        assert_eq!(surface.lookup(0.1, f64::NAN), surface.fill_value());
    }

    #[test]
    fn test_lookup_floors_expiry() {
        let points = [VolPoint::new(TIME_EPSILON, 100.0, 0.25), VolPoint::new(0.1, 100.0, 0.35)];
        let surface = GridVolSurface::from_points(&points).unwrap();

        // Zero and negative expiries are queried at the floor, which is a node
        assert_relative_eq!(surface.lookup(0.0, 100.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(surface.lookup(-1.0, 100.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_surface() {
        let points = [VolPoint::new(3.0 / 365.0, 24900.0, 0.0737)];
        let surface = GridVolSurface::from_points(&points).unwrap();

        assert_relative_eq!(surface.lookup(3.0 / 365.0, 24900.0), 0.0737, epsilon = 1e-12);
        // Any other point is outside the degenerate box
        assert_relative_eq!(surface.lookup(3.0 / 365.0, 25000.0), 0.0737, epsilon = 1e-12);
        assert_eq!(surface.strike_domain(), (24900.0, 24900.0));
    }
}
