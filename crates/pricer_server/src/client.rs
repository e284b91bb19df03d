//! WebSocket client for the Greeks server
//!
//! Provides:
//! - [`GreeksClient`]: one WebSocket session, one reply per snapshot sent
//! - [`static_snapshots`]: two fixed NIFTY snapshots for smoke testing
//! - [`SyntheticFeed`]: a jittered NIFTY chain standing in for a live feed

use chrono::{SecondsFormat, Utc};
use futures::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Client-side session errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or handshake failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The server closed the session before replying
    #[error("Connection closed before a reply arrived")]
    Closed,
}

/// One WebSocket session with the server
pub struct GreeksClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GreeksClient {
    /// Connect to a `ws://host:port/ws` endpoint
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _) = connect_async(url).await?;
        tracing::info!(%url, "Connected to Greeks server");
        Ok(Self { stream })
    }

    /// Send one snapshot as a text frame without waiting for the reply
    pub async fn send_text(&mut self, snapshot: &str) -> Result<(), ClientError> {
        self.stream.send(Message::Text(snapshot.to_owned().into())).await?;
        Ok(())
    }

    /// Send one snapshot as a binary frame without waiting for the reply
    pub async fn send_binary(&mut self, payload: Vec<u8>) -> Result<(), ClientError> {
        self.stream.send(Message::binary(payload)).await?;
        Ok(())
    }

    /// Wait for the next reply frame
    pub async fn next_reply(&mut self) -> Result<String, ClientError> {
        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => return Ok(text.as_str().to_owned()),
                Message::Binary(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Message::Close(_) => return Err(ClientError::Closed),
                _ => continue,
            }
        }
        Err(ClientError::Closed)
    }

    /// Send one snapshot and wait for its reply
    pub async fn request(&mut self, snapshot: &str) -> Result<String, ClientError> {
        self.send_text(snapshot).await?;
        self.next_reply().await
    }

    /// Close the session, returning any reply frames that arrived meanwhile
    pub async fn close(mut self) -> Result<Vec<String>, ClientError> {
        self.stream.close(None).await?;

        let mut unread = Vec::new();
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => unread.push(text.as_str().to_owned()),
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    break
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(unread)
    }
}

/// Two consecutive NIFTY snapshots one minute apart
pub fn static_snapshots() -> Vec<Value> {
    vec![
        json!({
            "timestamp": "2025-08-25T16:50:00Z",
            "underlying_symbol": "NIFTY",
            "underlying_price": 24967.75,
            "risk_free_rate": 0.0545,
            "data": [
                {
                    "strike": 24900.0,
                    "expiry_date": "2025-08-28",
                    "call_option": {"implied_volatility": 0.0901, "ltp": 123.15},
                    "put_option": {"implied_volatility": 0.0573, "ltp": 58.65}
                },
                {
                    "strike": 25000.0,
                    "expiry_date": "2025-08-28",
                    "call_option": {"implied_volatility": 0.078, "ltp": 69.75},
                    "put_option": {"implied_volatility": 0.0873, "ltp": 106.05}
                }
            ]
        }),
        json!({
            "timestamp": "2025-08-25T16:51:00Z",
            "underlying_symbol": "NIFTY",
            "underlying_price": 24980.50,
            "risk_free_rate": 0.0545,
            "data": [
                {
                    "strike": 24950.0,
                    "expiry_date": "2025-08-28",
                    "call_option": {"implied_volatility": 0.085, "ltp": 101.40},
                    "put_option": {"implied_volatility": 0.061, "ltp": 76.25}
                },
                {
                    "strike": 25100.0,
                    "expiry_date": "2025-09-04",
                    "call_option": {"implied_volatility": 0.092, "ltp": 44.30},
                    "put_option": {"implied_volatility": 0.094, "ltp": 132.10}
                }
            ]
        }),
    ]
}

/// Base level of one jittered contract side
struct SideLevel {
    iv: f64,
    ltp: f64,
}

/// Synthetic NIFTY feed
///
/// Every snapshot is stamped with the current time and draws the underlying
/// uniformly within ±20 of its base, implied volatilities within ±0.01 and
/// last traded prices within ±5.
pub struct SyntheticFeed {
    rng: StdRng,
    base_price: f64,
    contracts: Vec<(f64, &'static str, SideLevel, SideLevel)>,
}

impl SyntheticFeed {
    /// Feed seeded from system entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible feed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            base_price: 25000.0,
            contracts: vec![
                (
                    24900.0,
                    "2025-08-28",
                    SideLevel { iv: 0.09, ltp: 120.0 },
                    SideLevel { iv: 0.06, ltp: 60.0 },
                ),
                (
                    25000.0,
                    "2025-08-28",
                    SideLevel { iv: 0.08, ltp: 70.0 },
                    SideLevel { iv: 0.085, ltp: 105.0 },
                ),
            ],
        }
    }

    /// Next snapshot of the feed
    pub fn next_snapshot(&mut self) -> Value {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let underlying_price = self.base_price + self.rng.gen_range(-20.0f64..20.0);

        let rng = &mut self.rng;
        let mut side = |level: &SideLevel| {
            json!({
                "implied_volatility": level.iv + rng.gen_range(-0.01f64..0.01),
                "ltp": level.ltp + rng.gen_range(-5.0f64..5.0),
            })
        };
        let data: Vec<Value> = self
            .contracts
            .iter()
            .map(|(strike, expiry, call, put)| {
                json!({
                    "strike": strike,
                    "expiry_date": expiry,
                    "call_option": side(call),
                    "put_option": side(put),
                })
            })
            .collect();

        json!({
            "timestamp": timestamp,
            "underlying_symbol": "NIFTY",
            "underlying_price": underlying_price,
            "risk_free_rate": 0.0545,
            "data": data,
        })
    }
}

impl Default for SyntheticFeed {
    fn default() -> Self {
        Self::new()
    }
}
