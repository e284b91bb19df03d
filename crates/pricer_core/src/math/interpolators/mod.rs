//! Interpolation methods for numerical computation.
//!
//! ## Available Interpolators
//!
//! - [`BilinearInterpolator`]: 2D grid interpolation for surfaces, degrading to
//!   linear interpolation along an axis holding a single point
//!
//! All interpolators are generic over `T: num_traits::Float`.
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::interpolators::BilinearInterpolator;
//!
//! let xs: [f64; 2] = [0.25, 0.5];
//! let ys = [90.0, 110.0];
//! let zs = [&[0.20, 0.22][..], &[0.24, 0.26][..]];
//!
//! let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
//! let z = interp.interpolate(0.375, 100.0).unwrap();
//! assert!((z - 0.23).abs() < 1e-12);
//! ```

mod bilinear;

pub use bilinear::BilinearInterpolator;
