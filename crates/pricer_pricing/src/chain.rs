//! Option chain snapshot data model.
//!
//! Wire types for one snapshot of an options chain and the engine's answer.
//! Field names follow the feed format:
//!
//! ```json
//! {
//!   "timestamp": "2025-08-25T16:50:00Z",
//!   "underlying_symbol": "NIFTY",
//!   "underlying_price": 24967.75,
//!   "risk_free_rate": 0.0545,
//!   "data": [
//!     {
//!       "strike": 24900.0,
//!       "expiry_date": "2025-08-28",
//!       "call_option": { "implied_volatility": 0.0901, "ltp": 120.5 },
//!       "put_option": { "implied_volatility": 0.0573, "ltp": 48.0 }
//!     }
//!   ]
//! }
//! ```

use std::fmt;

use pricer_core::types::{Date, DateError};
use pricer_models::analytical::GreeksResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PipelineError;

/// One side (call or put) of a quoted contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideQuote {
    /// Observed implied volatility; zero, negative or missing means no observation
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    /// Last traded price, informational only
    #[serde(default)]
    pub ltp: Option<f64>,
}

impl SideQuote {
    /// The implied volatility if it is a usable observation.
    ///
    /// # Examples
    /// ```
    /// use pricer_pricing::chain::SideQuote;
    ///
    /// let side = SideQuote { implied_volatility: Some(0.0), ltp: Some(12.0) };
    /// assert_eq!(side.observed_volatility(), None);
    /// ```
    #[inline]
    pub fn observed_volatility(&self) -> Option<f64> {
        self.implied_volatility
            .filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// Contract expiry as sent by the feed.
///
/// Keeps the calendar date for pricing and the original text for the echo
/// in [`ContractResult`], so `"2025-8-28"` comes back as `"2025-8-28"`.
///
/// # Examples
/// ```
/// use pricer_core::types::Date;
/// use pricer_pricing::chain::ExpiryDate;
///
/// let expiry = ExpiryDate::parse("2025-8-28").unwrap();
/// assert_eq!(expiry.date(), Date::from_ymd(2025, 8, 28).unwrap());
/// assert_eq!(expiry.as_str(), "2025-8-28");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryDate {
    date: Date,
    raw: String,
}

impl ExpiryDate {
    /// Parses a `YYYY-MM-DD` expiry, keeping the input text.
    pub fn parse(raw: &str) -> Result<Self, DateError> {
        Ok(Self {
            date: Date::parse(raw)?,
            raw: raw.to_string(),
        })
    }

    /// Calendar date of the expiry.
    #[inline]
    pub fn date(&self) -> Date {
        self.date
    }

    /// The expiry exactly as received.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<Date> for ExpiryDate {
    fn from(date: Date) -> Self {
        Self {
            date,
            raw: date.to_string(),
        }
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ExpiryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ExpiryDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ExpiryDate::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One strike/expiry contract of the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Strike price
    pub strike: f64,
    /// Expiry calendar date
    pub expiry_date: ExpiryDate,
    /// Call side, if quoted
    #[serde(default)]
    pub call_option: Option<SideQuote>,
    /// Put side, if quoted
    #[serde(default)]
    pub put_option: Option<SideQuote>,
}

impl Quote {
    /// Usable volatility observations of this contract, call side first.
    pub fn observed_volatilities(&self) -> impl Iterator<Item = f64> + '_ {
        [self.call_option.as_ref(), self.put_option.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(SideQuote::observed_volatility)
    }
}

/// One snapshot of an options chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// ISO 8601 observation timestamp, kept verbatim for cache keys
    pub timestamp: String,
    /// Underlying identifier
    pub underlying_symbol: String,
    /// Underlying price
    pub underlying_price: f64,
    /// Continuously compounded risk-free rate
    #[serde(default)]
    pub risk_free_rate: f64,
    /// Quotes in feed order
    pub data: Vec<Quote>,
}

impl Snapshot {
    /// Parses and validates a JSON snapshot.
    ///
    /// # Errors
    /// `PipelineError::InvalidSnapshot` for malformed JSON, missing required
    /// fields, wrongly typed values or out-of-range prices.
    ///
    /// # Examples
    /// ```
    /// use pricer_pricing::chain::Snapshot;
    ///
    /// let raw = r#"{"timestamp":"2025-08-25T16:50:00Z","underlying_symbol":"NIFTY",
    ///               "underlying_price":24967.75,"data":[]}"#;
    /// let snapshot = Snapshot::from_json(raw).unwrap();
    /// assert_eq!(snapshot.risk_free_rate, 0.0);
    ///
    /// assert!(Snapshot::from_json(r#"{"underlying_symbol":"NIFTY"}"#).is_err());
    /// ```
    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks the numeric preconditions of the pricing formulas.
    ///
    /// Underlying price and strikes must be finite and positive; the rate
    /// must be finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.underlying_price.is_finite() && self.underlying_price > 0.0) {
            return Err(PipelineError::InvalidSnapshot(format!(
                "underlying_price must be finite and positive, got {}",
                self.underlying_price
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PipelineError::InvalidSnapshot(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        if let Some((i, quote)) = self
            .data
            .iter()
            .enumerate()
            .find(|(_, q)| !(q.strike.is_finite() && q.strike > 0.0))
        {
            return Err(PipelineError::InvalidSnapshot(format!(
                "data[{}].strike must be finite and positive, got {}",
                i, quote.strike
            )));
        }
        Ok(())
    }
}

/// Price and Greeks of both sides of one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractResult {
    /// Strike price
    pub strike: f64,
    /// Expiry, echoed as received
    pub expiry_date: ExpiryDate,
    /// Volatility read from the snapshot surface
    pub iv: f64,
    /// Call price and Greeks
    pub call: GreeksResult,
    /// Put price and Greeks
    pub put: GreeksResult,
}

/// Engine answer for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResult {
    /// Underlying identifier
    pub symbol: String,
    /// Snapshot timestamp, verbatim
    pub timestamp: String,
    /// One entry per quote, in input order
    pub results: Vec<ContractResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIFTY: &str = r#"{
        "timestamp": "2025-08-25T16:50:00Z",
        "underlying_symbol": "NIFTY",
        "underlying_price": 24967.75,
        "risk_free_rate": 0.0545,
        "data": [
            {
                "strike": 24900.0,
                "expiry_date": "2025-08-28",
                "call_option": {"implied_volatility": 0.0901, "ltp": 120.5},
                "put_option": {"implied_volatility": 0.0573, "ltp": 48.0}
            },
            {
                "strike": 25000,
                "expiry_date": "2025-08-28",
                "call_option": {"implied_volatility": null},
                "put_option": null
            },
            {
                "strike": 25100.0,
                "expiry_date": "2025-09-04"
            }
        ]
    }"#;

    #[test]
    fn test_parse_feed_snapshot() {
        let snapshot = Snapshot::from_json(NIFTY).unwrap();
        assert_eq!(snapshot.underlying_symbol, "NIFTY");
        assert_eq!(snapshot.data.len(), 3);
        assert_eq!(snapshot.data[1].strike, 25000.0);
        assert_eq!(snapshot.data[0].expiry_date.date(), Date::from_ymd(2025, 8, 28).unwrap());

        let observed: Vec<f64> = snapshot.data[0].observed_volatilities().collect();
        assert_eq!(observed, vec![0.0901, 0.0573]);
        assert_eq!(snapshot.data[1].observed_volatilities().count(), 0);
        assert_eq!(snapshot.data[2].observed_volatilities().count(), 0);
    }

    #[test]
    fn test_observed_volatility_filter() {
        for iv in [None, Some(0.0), Some(-0.1), Some(f64::NAN)] {
            let side = SideQuote {
                implied_volatility: iv,
                ltp: None,
            };
            assert_eq!(side.observed_volatility(), None);
        }
        let side = SideQuote {
            implied_volatility: Some(0.15),
            ltp: None,
        };
        assert_eq!(side.observed_volatility(), Some(0.15));
    }

    #[test]
    fn test_missing_required_fields() {
        for raw in [
            r#"{"underlying_symbol":"X","underlying_price":1.0,"data":[]}"#,
            r#"{"timestamp":"2025-08-25","underlying_price":1.0,"data":[]}"#,
            r#"{"timestamp":"2025-08-25","underlying_symbol":"X","data":[]}"#,
            r#"{"timestamp":"2025-08-25","underlying_symbol":"X","underlying_price":1.0}"#,
        ] {
            assert!(matches!(
                Snapshot::from_json(raw),
                Err(PipelineError::InvalidSnapshot(_))
            ));
        }
    }

    #[test]
    fn test_wrongly_typed_fields() {
        let raw = r#"{"timestamp":"2025-08-25","underlying_symbol":"X",
                      "underlying_price":"abc","data":[]}"#;
        assert!(Snapshot::from_json(raw).is_err());

        let raw = r#"{"timestamp":"2025-08-25","underlying_symbol":"X","underlying_price":100,
                      "data":[{"strike":100,"expiry_date":"28/08/2025"}]}"#;
        assert!(Snapshot::from_json(raw).is_err());

        assert!(Snapshot::from_json("not json").is_err());
    }

    #[test]
    fn test_out_of_range_values() {
        let raw = r#"{"timestamp":"2025-08-25","underlying_symbol":"X","underlying_price":0,
                      "data":[]}"#;
        assert!(Snapshot::from_json(raw).is_err());

        let raw = r#"{"timestamp":"2025-08-25","underlying_symbol":"X","underlying_price":100,
                      "data":[{"strike":-5,"expiry_date":"2025-08-28"}]}"#;
        match Snapshot::from_json(raw) {
            Err(PipelineError::InvalidSnapshot(msg)) => assert!(msg.contains("data[0].strike")),
            other => panic!("Expected InvalidSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_result_serialises_expiry_as_date_string() {
        let result = ContractResult {
            strike: 100.0,
            expiry_date: Date::from_ymd(2025, 8, 28).unwrap().into(),
            iv: 0.2,
            call: GreeksResult::default(),
            put: GreeksResult::default(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["expiry_date"], "2025-08-28");
        assert_eq!(json["call"]["theta"], 0.0);
    }

    #[test]
    fn test_expiry_echoed_verbatim() {
        let raw = r#"{"timestamp":"2025-08-25","underlying_symbol":"X","underlying_price":100,
                      "data":[{"strike":100,"expiry_date":"2025-8-28"}]}"#;
        let snapshot = Snapshot::from_json(raw).unwrap();
        let expiry = &snapshot.data[0].expiry_date;

        assert_eq!(expiry.date(), Date::from_ymd(2025, 8, 28).unwrap());
        assert_eq!(expiry.as_str(), "2025-8-28");
        assert_eq!(serde_json::to_value(expiry).unwrap(), "2025-8-28");
    }

    #[test]
    fn test_invalid_expiry_rejected() {
        assert!(ExpiryDate::parse("2025-02-30").is_err());
        assert!(ExpiryDate::parse("next thursday").is_err());
    }
}
