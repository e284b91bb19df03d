//! # pricer_pricing: Snapshot Pipeline (Layer 3)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing turns option chain snapshots into prices and Greeks:
//! - Wire types for snapshots and results (`chain`)
//! - Surface building from observed implied volatilities (`surface`)
//! - Per-contract evaluation against a surface (`evaluator`)
//! - Bounded surface cache with one builder per key (`cache`)
//! - Fixed-size CPU worker pool bridged to async callers (`pool`)
//! - The request coordinator tying these together (`pipeline`)
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::{PipelineConfig, SnapshotPipeline};
//!
//! let pipeline = SnapshotPipeline::new(PipelineConfig::default()).unwrap();
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//!
//! let raw = r#"{"timestamp":"2025-08-25T16:50:00Z","underlying_symbol":"NIFTY",
//!               "underlying_price":24967.75,"data":[]}"#;
//! let result = rt.block_on(pipeline.process_json(raw)).unwrap();
//! assert!(result.results.is_empty());
//! assert_eq!(pipeline.cache_stats().builds, 1);
//! ```
//!
//! ## Concurrency Model
//!
//! Each request is one async coordinator. CPU work (surface builds and
//! contract evaluations) runs on the [`pool::WorkerPool`]; results come back
//! through oneshot channels and are gathered in input order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod chain;
pub mod error;
pub mod evaluator;
pub mod pipeline;
pub mod pool;
pub mod surface;

// Re-export commonly used items for convenience
pub use cache::{CacheKey, CacheStats, SurfaceCache};
pub use chain::{ContractResult, ExpiryDate, Quote, SideQuote, Snapshot, SnapshotResult};
pub use error::PipelineError;
pub use pipeline::{PipelineConfig, SnapshotPipeline};
pub use pool::WorkerPool;
