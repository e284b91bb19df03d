//! WebSocket and HTTP server for the realtime options Greeks engine
//!
//! This crate exposes the snapshot pipeline over a WebSocket (one reply per
//! snapshot frame) and an equivalent HTTP JSON endpoint, with health and
//! readiness probes. A WebSocket client for replaying snapshots lives in
//! [`client`].

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;

// Re-export pricer dependencies for integration
pub use pricer_pricing;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
