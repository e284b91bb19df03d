//! Bilinear 2D interpolation for surfaces.

use crate::types::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator for 2D grid data.
///
/// Stores a 2D grid of values z(x, y) and performs bilinear interpolation
/// to compute values at arbitrary (x, y) coordinates within the grid.
///
/// An axis may hold a single coordinate. Along such an axis the grid is a
/// line (or a point), and a query is inside the domain only when it matches
/// that coordinate exactly.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`, `f32`)
///
/// # Grid Layout
///
/// The grid is stored as `zs[i][j] = z(xs[i], ys[j])` where:
/// - `xs` defines the x-axis coordinates (rows)
/// - `ys` defines the y-axis coordinates (columns)
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::BilinearInterpolator;
///
/// let xs: [f64; 3] = [0.0, 1.0, 2.0];
/// let ys = [0.0, 1.0];
/// let zs = [
///     &[0.0, 1.0][..],
///     &[2.0, 3.0][..],
///     &[4.0, 5.0][..],
/// ];
///
/// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
/// let z = interp.interpolate(0.5, 0.5).unwrap();
/// assert!((z - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    /// X-axis coordinates
    xs: Vec<T>,
    /// Y-axis coordinates
    ys: Vec<T>,
    /// Grid values: zs[i][j] = z(xs[i], ys[j])
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct a bilinear interpolator from grid data.
    ///
    /// # Arguments
    ///
    /// * `xs` - Strictly increasing x-axis coordinates (length >= 1)
    /// * `ys` - Strictly increasing y-axis coordinates (length >= 1)
    /// * `zs` - Slice of slices representing the grid values
    ///
    /// # Returns
    ///
    /// * `Ok(BilinearInterpolator)` - Successfully constructed interpolator
    /// * `Err(InterpolationError::InsufficientData)` - An axis is empty
    /// * `Err(InterpolationError::NonMonotonicData)` - An axis is not strictly increasing
    /// * `Err(InterpolationError::InvalidInput)` - Grid dimensions don't match axis lengths
    ///   or a coordinate is not finite
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::interpolators::BilinearInterpolator;
    ///
    /// // Single expiry row
    /// let xs: [f64; 1] = [0.25];
    /// let ys = [90.0, 110.0];
    /// let zs = [&[0.20, 0.30][..]];
    ///
    /// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
    /// assert!((interp.interpolate(0.25, 100.0).unwrap() - 0.25).abs() < 1e-12);
    /// ```
    pub fn new(xs: &[T], ys: &[T], zs: &[&[T]]) -> Result<Self, InterpolationError> {
        validate_axis(xs, "x")?;
        validate_axis(ys, "y")?;

        // Validate grid dimensions
        if zs.len() != xs.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "Grid rows ({}) must match x-axis length ({})",
                zs.len(),
                xs.len()
            )));
        }

        for (i, row) in zs.iter().enumerate() {
            if row.len() != ys.len() {
                return Err(InterpolationError::InvalidInput(format!(
                    "Grid row {} length ({}) must match y-axis length ({})",
                    i,
                    row.len(),
                    ys.len()
                )));
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.iter().map(|row| row.to_vec()).collect(),
        })
    }

    /// Interpolate value at point (x, y) using bilinear interpolation.
    ///
    /// # Formula
    ///
    /// ```text
    /// z = (1-u)(1-v)*z00 + u*(1-v)*z10 + (1-u)*v*z01 + u*v*z11
    /// ```
    ///
    /// where `u` and `v` are the normalised coordinates within the grid cell.
    /// On a single-point axis the normalised coordinate is zero.
    ///
    /// # Returns
    ///
    /// * `Ok(z)` - The interpolated value
    /// * `Err(InterpolationError::OutOfBounds)` - If (x, y) is outside the grid
    pub fn interpolate(&self, x: T, y: T) -> Result<T, InterpolationError> {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();

        // NaN fails both comparisons, so test for inclusion
        if !(x >= x_min && x <= x_max) {
            return Err(out_of_bounds(x, x_min, x_max));
        }
        if !(y >= y_min && y <= y_max) {
            return Err(out_of_bounds(y, y_min, y_max));
        }

        let (i0, i1, u) = locate(&self.xs, x);
        let (j0, j1, v) = locate(&self.ys, y);

        // Get cell corner values
        let z00 = self.zs[i0][j0];
        let z10 = self.zs[i1][j0];
        let z01 = self.zs[i0][j1];
        let z11 = self.zs[i1][j1];

        let one = T::one();
        let z =
            (one - u) * (one - v) * z00 + u * (one - v) * z10 + (one - u) * v * z01 + u * v * z11;

        Ok(z)
    }

    /// Whether (x, y) lies inside the interpolation domain.
    #[inline]
    pub fn contains(&self, x: T, y: T) -> bool {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();
        x >= x_min && x <= x_max && y >= y_min && y <= y_max
    }

    /// Return the valid interpolation domain for x.
    #[inline]
    pub fn domain_x(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Return the valid interpolation domain for y.
    #[inline]
    pub fn domain_y(&self) -> (T, T) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }

    /// Returns a reference to the x-axis coordinates.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Returns a reference to the y-axis coordinates.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Returns a reference to the grid values.
    #[inline]
    pub fn zs(&self) -> &[Vec<T>] {
        &self.zs
    }
}

fn validate_axis<T: Float>(axis: &[T], name: &str) -> Result<(), InterpolationError> {
    if axis.is_empty() {
        return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
    }
    if let Some(pos) = axis.iter().position(|v| !v.is_finite()) {
        return Err(InterpolationError::InvalidInput(format!(
            "{}-axis coordinate {} is not finite",
            name, pos
        )));
    }
    if let Some(pos) = axis.windows(2).position(|w| w[1] <= w[0]) {
        return Err(InterpolationError::NonMonotonicData { index: pos + 1 });
    }
    Ok(())
}

/// Cell bounds and normalised offset of `x` on a sorted axis.
///
/// Caller guarantees `axis[0] <= x <= axis[last]`.
#[inline]
fn locate<T: Float>(axis: &[T], x: T) -> (usize, usize, T) {
    if axis.len() == 1 {
        return (0, 0, T::zero());
    }
    let pos = axis.partition_point(|&a| a <= x);
    let i = pos.saturating_sub(1).min(axis.len() - 2);
    let (x0, x1) = (axis[i], axis[i + 1]);
    (i, i + 1, (x - x0) / (x1 - x0))
}

fn out_of_bounds<T: Float>(x: T, min: T, max: T) -> InterpolationError {
    InterpolationError::OutOfBounds {
        x: x.to_f64().unwrap_or(f64::NAN),
        min: min.to_f64().unwrap_or(f64::NAN),
        max: max.to_f64().unwrap_or(f64::NAN),
    }
}
