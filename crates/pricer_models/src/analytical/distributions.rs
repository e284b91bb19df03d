//! Standard normal distribution functions.
//!
//! - `norm_cdf`: Cumulative distribution function Φ
//! - `norm_pdf`: Probability density function φ
//!
//! Both are generic over `T: Float`. The CDF is built on an erfc approximation
//! that is antisymmetric by construction, so Φ(x) + Φ(−x) = 1 holds to within
//! 1e-9 (the approximation error at zero) and put-call parity holds with it.

use num_traits::Float;

/// Square root of 2.
const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Abramowitz and Stegun 7.1.26 coefficients, highest order last.
const ERFC_COEFFS: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

/// Abramowitz and Stegun 7.1.26 scale factor.
const ERFC_P: f64 = 0.327_591_1;

/// Converts an `f64` constant into `T`.
#[inline]
pub(crate) fn constant<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Complementary error function, Abramowitz and Stegun 7.1.26.
///
/// Maximum absolute error 1.5e-7. Negative arguments use
/// erfc(−x) = 2 − erfc(x).
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let abs_x = x.abs();
    let t = T::one() / (T::one() + constant::<T>(ERFC_P) * abs_x);

    // Horner evaluation
    let poly = ERFC_COEFFS
        .iter()
        .rev()
        .fold(T::zero(), |acc, &a| constant::<T>(a) + t * acc);

    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < T::zero() {
        constant::<T>(2.0) - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = ½·erfc(−x/√2)
///
/// # Accuracy
/// Absolute error below 1e-7 for all finite x; output always in [0, 1].
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!((norm_cdf(1.5_f64) + norm_cdf(-1.5_f64) - 1.0).abs() < 1e-12);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    constant::<T>(0.5) * erfc_approx(-x / constant::<T>(SQRT_2))
}

/// Standard normal probability density function.
///
/// φ(x) = exp(−x²/2) / √(2π)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-9);
/// assert!((norm_pdf(1.0_f64) - 0.2419707245).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    constant::<T>(FRAC_1_SQRT_2PI) * (-constant::<T>(0.5) * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==========================================================
    // norm_cdf tests
    // ==========================================================

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(0.0_f64), 0.5, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(1.0_f64), 0.8413447460685429, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(-1.0_f64), 0.15865525393145707, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(2.0_f64), 0.9772498680518208, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(-2.0_f64), 0.022750131948179195, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(3.0_f64), 0.9986501019683699, epsilon = 1e-7);
    }

    #[test]
    fn test_norm_cdf_symmetry() {
        for i in -80..=80 {
            let x = i as f64 * 0.1;
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-8);
        }
        // Away from zero both sides share one erfc evaluation
        assert_relative_eq!(norm_cdf(0.7_f64) + norm_cdf(-0.7_f64), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_norm_cdf_monotonic_and_bounded() {
        let mut prev = norm_cdf(-5.0_f64);
        for i in -49..=50 {
            let x = i as f64 * 0.1;
            let cdf = norm_cdf(x);
            assert!(cdf > prev, "CDF not monotonic at x = {}", x);
            assert!((0.0..=1.0).contains(&cdf));
            prev = cdf;
        }
    }

    #[test]
    fn test_norm_cdf_tails() {
        assert!(norm_cdf(10.0_f64) <= 1.0);
        assert!(norm_cdf(10.0_f64) > 0.9999999);
        assert!(norm_cdf(-10.0_f64) >= 0.0);
        assert!(norm_cdf(-10.0_f64) < 1e-7);
        // Far tails saturate without producing NaN
        assert_eq!(norm_cdf(-40.0_f64), 0.0);
        assert_eq!(norm_cdf(40.0_f64), 1.0);
    }

    #[test]
    fn test_norm_cdf_f32() {
        assert!((norm_cdf(0.0_f32) - 0.5).abs() < 1e-5);
    }

    // ==========================================================
    // norm_pdf tests
    // ==========================================================

    #[test]
    fn test_norm_pdf_reference_values() {
        assert_relative_eq!(norm_pdf(0.0_f64), FRAC_1_SQRT_2PI, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(2.0_f64), 0.05399096651318806, epsilon = 1e-12);
        assert_relative_eq!(norm_pdf(-3.0_f64), 0.004431848411938008, epsilon = 1e-12);
    }

    #[test]
    fn test_cdf_derivative_matches_pdf() {
        let h = 1e-4;
        for x in [-2.0, -1.0, 0.0, 1.0, 2.0] {
            let fd = (norm_cdf(x + h) - norm_cdf(x - h)) / (2.0 * h);
            assert_relative_eq!(fd, norm_pdf(x), epsilon = 1e-4);
        }
    }
}
