//! Flat volatility surface implementation.

use super::VolatilitySurface;
use num_traits::Float;

/// Flat volatility surface with constant implied volatility.
///
/// The same volatility applies to all strike and expiry combinations. Used as
/// the fallback surface for snapshots carrying no usable observation.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`, `f32`)
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{FlatVol, VolatilitySurface};
///
/// let surface = FlatVol::new(0.20_f64);
///
/// assert_eq!(surface.lookup(0.5, 80.0), 0.20);
/// assert_eq!(surface.lookup(2.0, 120.0), 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatVol<T: Float> {
    /// The constant implied volatility
    sigma: T,
}

impl<T: Float> FlatVol<T> {
    /// Construct a flat volatility surface.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::market_data::surfaces::FlatVol;
    ///
    /// let surface = FlatVol::new(0.25_f64);
    /// assert_eq!(surface.sigma(), 0.25);
    /// ```
    #[inline]
    pub fn new(sigma: T) -> Self {
        Self { sigma }
    }

    /// Return the constant volatility.
    #[inline]
    pub fn sigma(&self) -> T {
        self.sigma
    }
}

impl<T: Float> VolatilitySurface<T> for FlatVol<T> {
    #[inline]
    fn lookup(&self, _expiry: T, _strike: T) -> T {
        self.sigma
    }

    /// Any strike is served.
    #[inline]
    fn strike_domain(&self) -> (T, T) {
        (T::zero(), T::infinity())
    }

    /// Any expiry is served.
    #[inline]
    fn expiry_domain(&self) -> (T, T) {
        (T::zero(), T::infinity())
    }
}
