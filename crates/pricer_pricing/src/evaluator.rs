//! Contract evaluator: one quote against a snapshot surface.

use pricer_core::market_data::{SnapshotSurface, VolatilitySurface};
use pricer_core::types::{time_to_expiry, Date, PricingError};
use pricer_models::analytical::{price_and_greeks, OptionSide};

use crate::chain::{ContractResult, Quote};

/// Prices both sides of one contract.
///
/// The surface is read once at the contract's (time to expiry, strike) and
/// the same volatility prices the call and the put.
///
/// # Arguments
/// * `quote` - The contract
/// * `surface` - Volatility surface of the snapshot
/// * `spot` - Underlying price
/// * `rate` - Risk-free rate
/// * `observed` - Observation date
///
/// # Errors
/// `PricingError::NumericalInstability` if any price or Greek is not finite.
pub fn evaluate(
    quote: &Quote,
    surface: &SnapshotSurface,
    spot: f64,
    rate: f64,
    observed: Date,
) -> Result<ContractResult, PricingError> {
    let expiry = time_to_expiry(observed, quote.expiry_date.date());
    let sigma = surface.lookup(expiry, quote.strike);

    let call = price_and_greeks(spot, quote.strike, expiry, rate, sigma, OptionSide::Call);
    let put = price_and_greeks(spot, quote.strike, expiry, rate, sigma, OptionSide::Put);

    call.ensure_finite().map_err(|e| contract_error(quote, "call", e))?;
    put.ensure_finite().map_err(|e| contract_error(quote, "put", e))?;

    Ok(ContractResult {
        strike: quote.strike,
        expiry_date: quote.expiry_date.clone(),
        iv: sigma,
        call,
        put,
    })
}

fn contract_error(quote: &Quote, side: &str, err: PricingError) -> PricingError {
    let PricingError::NumericalInstability(msg) = err;
    PricingError::NumericalInstability(format!(
        "{} {} {}: {}",
        quote.strike, quote.expiry_date, side, msg
    ))
}
