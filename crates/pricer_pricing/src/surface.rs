//! Surface builder: snapshot quotes to a volatility surface.

use pricer_core::market_data::{SnapshotSurface, VolPoint};
use pricer_core::types::{time_to_expiry, Date};

use crate::chain::Quote;
use crate::error::PipelineError;

/// Builds the volatility surface of one snapshot.
///
/// Every usable call or put observation becomes one point at
/// (time to expiry, strike). Calls and puts are pooled into a single grid.
/// A chain without any usable observation yields the constant fallback
/// surface.
///
/// # Arguments
/// * `quotes` - The snapshot's quotes
/// * `observed` - Observation date, the origin of time to expiry
///
/// # Examples
/// ```
/// use pricer_core::market_data::VolatilitySurface;
/// use pricer_core::types::Date;
/// use pricer_pricing::surface::build_surface;
///
/// let observed = Date::from_ymd(2025, 8, 25).unwrap();
/// let surface = build_surface(&[], observed).unwrap();
/// assert!(surface.is_fallback());
/// assert_eq!(surface.lookup(0.1, 100.0), 0.2);
/// ```
pub fn build_surface(quotes: &[Quote], observed: Date) -> Result<SnapshotSurface, PipelineError> {
    let points: Vec<VolPoint<f64>> = quotes
        .iter()
        .flat_map(|quote| {
            let expiry = time_to_expiry(observed, quote.expiry_date.date());
            quote
                .observed_volatilities()
                .map(move |vol| VolPoint::new(expiry, quote.strike, vol))
        })
        .collect();

    let surface = SnapshotSurface::from_points(&points)?;

    match &surface {
        SnapshotSurface::Grid(grid) => {
            let (expiries, strikes) = grid.shape();
            tracing::debug!(
                points = points.len(),
                expiries,
                strikes,
                observed_cells = grid.observed_cells(),
                fill = grid.fill_value(),
                "Built grid volatility surface"
            );
        }
        SnapshotSurface::Flat(_) => {
            tracing::debug!(quotes = quotes.len(), "No usable observations, using fallback surface");
        }
    }

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ExpiryDate, SideQuote};
    use approx::assert_relative_eq;
    use pricer_core::market_data::{VolatilitySurface, FALLBACK_VOLATILITY};
    use proptest::prelude::*;

    fn quote(strike: f64, expiry: &str, call_iv: Option<f64>, put_iv: Option<f64>) -> Quote {
        let side = |iv: Option<f64>| {
            iv.map(|v| SideQuote {
                implied_volatility: Some(v),
                ltp: None,
            })
        };
        Quote {
            strike,
            expiry_date: ExpiryDate::parse(expiry).unwrap(),
            call_option: side(call_iv),
            put_option: side(put_iv),
        }
    }

    fn observed() -> Date {
        Date::from_ymd(2025, 8, 25).unwrap()
    }

    #[test]
    fn test_call_and_put_are_pooled() {
        let quotes = [quote(24900.0, "2025-08-28", Some(0.0901), Some(0.0573))];
        let surface = build_surface(&quotes, observed()).unwrap();

        assert!(!surface.is_fallback());
        assert_relative_eq!(surface.lookup(3.0 / 365.0, 24900.0), 0.0737, epsilon = 1e-12);
    }

    #[test]
    fn test_unobserved_quotes_are_skipped() {
        let quotes = [
            quote(100.0, "2025-09-25", None, None),
            quote(110.0, "2025-09-25", Some(0.0), Some(-1.0)),
            quote(120.0, "2025-09-25", None, Some(0.30)),
        ];
        let surface = build_surface(&quotes, observed()).unwrap();

        match &surface {
            SnapshotSurface::Grid(grid) => assert_eq!(grid.shape(), (1, 1)),
            SnapshotSurface::Flat(_) => panic!("Expected grid surface"),
        }
        assert_relative_eq!(surface.lookup(31.0 / 365.0, 100.0), 0.30, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_chain_falls_back() {
        let quotes = [quote(100.0, "2025-09-25", None, Some(0.0))];
        let surface = build_surface(&quotes, observed()).unwrap();

        assert!(surface.is_fallback());
        assert_eq!(surface.lookup(0.5, 100.0), FALLBACK_VOLATILITY);
    }

    #[test]
    fn test_grid_over_two_expiries() {
        let quotes = [
            quote(100.0, "2025-08-28", Some(0.20), None),
            quote(110.0, "2025-08-28", Some(0.30), None),
            quote(100.0, "2025-09-04", None, Some(0.40)),
        ];
        let surface = build_surface(&quotes, observed()).unwrap();

        // Missing (2025-09-04, 110) cell takes the mean 0.30
        assert_relative_eq!(surface.lookup(10.0 / 365.0, 110.0), 0.30, epsilon = 1e-12);
        assert_relative_eq!(surface.lookup(3.0 / 365.0, 105.0), 0.25, epsilon = 1e-12);
    }

    const EXPIRIES: [&str; 4] = ["2025-08-28", "2025-09-04", "2025-09-25", "2025-12-24"];

    proptest! {
        #[test]
        fn prop_lookup_within_observed_range(
            contracts in prop::collection::vec(
                (0usize..20, 0usize..4, 0.01f64..1.0, prop::option::of(0.01f64..1.0)),
                1..40,
            ),
            t in 0.0f64..1.0,
            k in 50.0f64..300.0,
        ) {
            let quotes: Vec<Quote> = contracts
                .iter()
                .map(|&(strike, expiry, call_iv, put_iv)| {
                    quote(100.0 + 5.0 * strike as f64, EXPIRIES[expiry], Some(call_iv), put_iv)
                })
                .collect();
            let observed_ivs = contracts
                .iter()
                .flat_map(|&(_, _, call_iv, put_iv)| std::iter::once(call_iv).chain(put_iv));
            let (lo, hi) = observed_ivs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

            let surface = build_surface(&quotes, observed()).unwrap();
            let sigma = surface.lookup(t, k);

            prop_assert!(!surface.is_fallback());
            prop_assert!(sigma >= lo - 1e-12 && sigma <= hi + 1e-12, "{} outside [{}, {}]", sigma, lo, hi);
        }
    }
}
