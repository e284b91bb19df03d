//! Volatility surface trait definition.

use num_traits::Float;

/// Generic volatility surface trait for implied volatility lookup.
///
/// # Contract
///
/// - `lookup(expiry, strike)` returns the implied volatility σ(T, K) and never
///   fails: implementations answer every query, including ones outside the
///   region the surface was built from
/// - `strike_domain()` returns the range of strikes backed by data
/// - `expiry_domain()` returns the range of expiries backed by data
///
/// # Invariants
///
/// - σ is finite and strictly positive for every finite query
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{FlatVol, VolatilitySurface};
///
/// let surface = FlatVol::new(0.20_f64);
/// assert_eq!(surface.lookup(1.0, 100.0), 0.20);
/// ```
pub trait VolatilitySurface<T: Float> {
    /// Return the implied volatility for a time to expiry (years) and strike.
    fn lookup(&self, expiry: T, strike: T) -> T;

    /// Return the strike domain backed by data.
    ///
    /// # Returns
    ///
    /// A tuple (K_min, K_max).
    fn strike_domain(&self) -> (T, T);

    /// Return the expiry domain backed by data.
    ///
    /// # Returns
    ///
    /// A tuple (T_min, T_max).
    fn expiry_domain(&self) -> (T, T);
}
