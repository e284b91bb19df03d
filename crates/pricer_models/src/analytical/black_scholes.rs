//! Black-Scholes pricing model for European options.
//!
//! This module provides the Black-Scholes model for pricing European
//! call and put options together with their analytical Greeks.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! Theta is reported per calendar day (annual theta / 365).
//!
//! ## Degenerate inputs
//!
//! For T ≤ 0 or σ ≤ 0 the price is the intrinsic value, delta is the
//! in-the-money indicator and all other Greeks are zero.

use num_traits::Float;
use pricer_core::types::{PricingError, DAYS_PER_YEAR};

use super::distributions::{constant, norm_cdf, norm_pdf};

/// Side of a European option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionSide {
    /// Right to buy at the strike
    Call,
    /// Right to sell at the strike
    Put,
}

impl OptionSide {
    /// Returns true for [`OptionSide::Call`].
    #[inline]
    pub fn is_call(self) -> bool {
        matches!(self, OptionSide::Call)
    }
}

/// Price and sensitivities of one option.
///
/// # Fields
/// - `price`: Theoretical value
/// - `delta`: ∂V/∂S
/// - `gamma`: ∂²V/∂S²
/// - `theta`: Value decay per calendar day
/// - `vega`: ∂V/∂σ (per unit volatility)
/// - `rho`: ∂V/∂r (per unit rate)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreeksResult<T = f64> {
    /// Theoretical price
    pub price: T,
    /// First derivative with respect to spot
    pub delta: T,
    /// Second derivative with respect to spot
    pub gamma: T,
    /// Time decay per calendar day
    pub theta: T,
    /// Sensitivity to volatility
    pub vega: T,
    /// Sensitivity to the risk-free rate
    pub rho: T,
}

impl<T: Float> GreeksResult<T> {
    /// Checks that every field is finite.
    ///
    /// # Errors
    /// `PricingError::NumericalInstability` naming the first non-finite field.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::GreeksResult;
    ///
    /// let mut greeks = GreeksResult::<f64>::default();
    /// assert!(greeks.ensure_finite().is_ok());
    ///
    /// greeks.gamma = f64::NAN;
    /// assert!(greeks.ensure_finite().is_err());
    /// ```
    pub fn ensure_finite(&self) -> Result<(), PricingError> {
        let fields = [
            ("price", self.price),
            ("delta", self.delta),
            ("gamma", self.gamma),
            ("theta", self.theta),
            ("vega", self.vega),
            ("rho", self.rho),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(PricingError::NumericalInstability(format!(
                "{} is not finite",
                name
            ))),
            None => Ok(()),
        }
    }
}

/// Black-Scholes model for European option pricing.
///
/// Holds the market state (spot, rate, volatility) and prices any
/// strike and expiry against it.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`, `f32`)
///
/// # Examples
/// ```
/// use pricer_models::analytical::{BlackScholes, OptionSide};
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2);
/// let call = bs.greeks(100.0, 1.0, OptionSide::Call);
/// let put = bs.greeks(100.0, 1.0, OptionSide::Put);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call.price - put.price - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes<T: Float> {
    /// Spot price (S)
    spot: T,
    /// Risk-free interest rate (r)
    rate: T,
    /// Volatility (σ)
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// Any volatility is accepted; σ ≤ 0 selects the degenerate branch.
    /// Spot positivity is the caller's responsibility.
    #[inline]
    pub fn new(spot: T, rate: T, volatility: T) -> Self {
        Self {
            spot,
            rate,
            volatility,
        }
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    /// Computes d₁ and d₂ for a strike and a positive expiry.
    ///
    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T), d₂ = d₁ - σ√T
    #[inline]
    pub fn d1_d2(&self, strike: T, expiry: T) -> (T, T) {
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let log_moneyness = (self.spot / strike).ln();
        let drift =
            (self.rate + constant::<T>(0.5) * self.volatility * self.volatility) * expiry;
        let d1 = (log_moneyness + drift) / vol_sqrt_t;
        (d1, d1 - vol_sqrt_t)
    }

    /// Computes price and Greeks of one option.
    ///
    /// # Arguments
    /// * `strike` - Strike price (K)
    /// * `expiry` - Time to expiration in years (T)
    /// * `side` - Call or put
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::{BlackScholes, OptionSide};
    ///
    /// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2);
    /// let call = bs.greeks(100.0, 1.0, OptionSide::Call);
    /// assert!((call.price - 10.4506).abs() < 1e-3);
    ///
    /// // Expired: intrinsic value
    /// let expired = BlackScholes::new(110.0_f64, 0.05, 0.2).greeks(100.0, 0.0, OptionSide::Call);
    /// assert_eq!(expired.price, 10.0);
    /// assert_eq!(expired.delta, 1.0);
    /// ```
    pub fn greeks(&self, strike: T, expiry: T, side: OptionSide) -> GreeksResult<T> {
        let zero = T::zero();
        if expiry <= zero || self.volatility <= zero {
            return self.intrinsic(strike, side);
        }

        let (s, k, r, sigma) = (self.spot, strike, self.rate, self.volatility);
        let sqrt_t = expiry.sqrt();
        let (d1, d2) = self.d1_d2(strike, expiry);
        let discounted_strike = k * (-r * expiry).exp();
        let pdf_d1 = norm_pdf(d1);

        // Shared by both sides
        let gamma = pdf_d1 / (s * sigma * sqrt_t);
        let vega = s * pdf_d1 * sqrt_t;
        let time_decay = -(s * pdf_d1 * sigma) / (constant::<T>(2.0) * sqrt_t);
        let days = constant::<T>(DAYS_PER_YEAR);

        match side {
            OptionSide::Call => {
                let nd1 = norm_cdf(d1);
                let nd2 = norm_cdf(d2);
                GreeksResult {
                    price: s * nd1 - discounted_strike * nd2,
                    delta: nd1,
                    gamma,
                    theta: (time_decay - r * discounted_strike * nd2) / days,
                    vega,
                    rho: expiry * discounted_strike * nd2,
                }
            }
            OptionSide::Put => {
                let n_neg_d1 = norm_cdf(-d1);
                let n_neg_d2 = norm_cdf(-d2);
                GreeksResult {
                    price: discounted_strike * n_neg_d2 - s * n_neg_d1,
                    delta: norm_cdf(d1) - T::one(),
                    gamma,
                    theta: (time_decay + r * discounted_strike * n_neg_d2) / days,
                    vega,
                    rho: -expiry * discounted_strike * n_neg_d2,
                }
            }
        }
    }

    /// Closed form at T ≤ 0 or σ ≤ 0.
    fn intrinsic(&self, strike: T, side: OptionSide) -> GreeksResult<T> {
        let (zero, one) = (T::zero(), T::one());
        let (price, delta) = match side {
            OptionSide::Call => (
                (self.spot - strike).max(zero),
                if self.spot > strike { one } else { zero },
            ),
            OptionSide::Put => (
                (strike - self.spot).max(zero),
                if self.spot < strike { -one } else { zero },
            ),
        };
        GreeksResult {
            price,
            delta,
            gamma: zero,
            theta: zero,
            vega: zero,
            rho: zero,
        }
    }
}

/// Price and Greeks of a European option under Black-Scholes.
///
/// # Arguments
/// * `spot` - Underlying price (S > 0)
/// * `strike` - Strike price (K > 0)
/// * `expiry` - Time to expiry in years (T)
/// * `rate` - Continuously compounded risk-free rate (r)
/// * `volatility` - Volatility (σ)
/// * `side` - Call or put
///
/// Never fails. S and K are validated by the caller.
///
/// # Examples
/// ```
/// use pricer_models::analytical::{price_and_greeks, OptionSide};
///
/// let put = price_and_greeks(100.0, 100.0, 1.0, 0.05, 0.2, OptionSide::Put);
/// assert!((put.price - 5.5735).abs() < 1e-3);
/// assert!(put.delta < 0.0);
/// ```
#[inline]
pub fn price_and_greeks(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    volatility: f64,
    side: OptionSide,
) -> GreeksResult<f64> {
    BlackScholes::new(spot, rate, volatility).greeks(strike, expiry, side)
}
