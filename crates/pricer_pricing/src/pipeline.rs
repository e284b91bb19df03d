//! Snapshot pipeline: one snapshot in, Greeks for every contract out.
//!
//! For each snapshot the pipeline:
//! 1. Derives the observation time from the raw timestamp (now if unparsable)
//! 2. Fetches the surface for (symbol, timestamp) from the [`SurfaceCache`],
//!    building it on the worker pool on a miss
//! 3. Evaluates every quote as its own worker task
//! 4. Gathers the results back into input order
//!
//! Any failing step fails the whole request. Dropping the future returned by
//! [`SnapshotPipeline::process`] abandons the request; tasks already on the
//! pool finish and their results are discarded.

use std::sync::Arc;

use futures::future::try_join_all;
use pricer_core::types::ObservationTime;
use tracing::Instrument;

use crate::cache::{CacheKey, CacheStats, SurfaceCache, DEFAULT_CACHE_CAPACITY};
use crate::chain::{ContractResult, Quote, Snapshot, SnapshotResult};
use crate::error::PipelineError;
use crate::evaluator::evaluate;
use crate::pool::{WorkerPool, DEFAULT_WORKER_THREADS};
use crate::surface::build_surface;

/// Pipeline sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of CPU worker threads
    pub worker_threads: usize,
    /// Maximum number of cached surfaces
    pub cache_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Snapshot processing engine shared by all connections.
///
/// # Examples
/// ```
/// use pricer_pricing::{PipelineConfig, Snapshot, SnapshotPipeline};
///
/// let pipeline = SnapshotPipeline::new(PipelineConfig::default()).unwrap();
/// let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
///
/// let raw = r#"{
///     "timestamp": "2025-08-25T16:50:00Z",
///     "underlying_symbol": "NIFTY",
///     "underlying_price": 24967.75,
///     "risk_free_rate": 0.0545,
///     "data": [{
///         "strike": 24900.0,
///         "expiry_date": "2025-08-28",
///         "call_option": {"implied_volatility": 0.0901},
///         "put_option": {"implied_volatility": 0.0573}
///     }]
/// }"#;
/// let result = rt.block_on(pipeline.process_json(raw)).unwrap();
///
/// assert_eq!(result.symbol, "NIFTY");
/// assert!((result.results[0].iv - 0.0737).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct SnapshotPipeline {
    pool: WorkerPool,
    cache: SurfaceCache,
}

impl SnapshotPipeline {
    /// Creates a pipeline with its own worker pool and empty cache.
    ///
    /// # Errors
    /// `PipelineError::WorkerFailed` if the worker pool cannot start.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let pool = WorkerPool::new(config.worker_threads)?;
        let cache = SurfaceCache::new(config.cache_capacity);
        tracing::info!(
            worker_threads = config.worker_threads,
            cache_capacity = cache.capacity(),
            "Snapshot pipeline ready"
        );
        Ok(Self { pool, cache })
    }

    /// Number of worker threads.
    pub fn worker_threads(&self) -> usize {
        self.pool.threads()
    }

    /// Current surface cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Parses a JSON snapshot and processes it.
    ///
    /// # Errors
    /// `PipelineError::InvalidSnapshot` for malformed input, otherwise as
    /// [`SnapshotPipeline::process`].
    pub async fn process_json(&self, raw: &str) -> Result<SnapshotResult, PipelineError> {
        let snapshot = Snapshot::from_json(raw)?;
        self.process(snapshot).await
    }

    /// Computes price and Greeks for every contract of `snapshot`.
    ///
    /// # Returns
    /// One result per quote, in input order.
    ///
    /// # Errors
    /// - `PipelineError::InvalidSnapshot` if the snapshot fails validation
    /// - `PipelineError::Pricing` if any contract yields non-finite values
    /// - `PipelineError::WorkerFailed` if a worker task panicked
    pub async fn process(&self, snapshot: Snapshot) -> Result<SnapshotResult, PipelineError> {
        let span = tracing::info_span!(
            "process",
            symbol = %snapshot.underlying_symbol,
            timestamp = %snapshot.timestamp
        );
        self.run(snapshot).instrument(span).await
    }

    async fn run(&self, snapshot: Snapshot) -> Result<SnapshotResult, PipelineError> {
        snapshot.validate()?;

        let Snapshot {
            timestamp,
            underlying_symbol: symbol,
            underlying_price: spot,
            risk_free_rate: rate,
            data,
        } = snapshot;

        let observed = ObservationTime::parse(&timestamp)
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Unparsable timestamp, observing at current time");
                ObservationTime::now()
            })
            .date();

        let quotes: Arc<[Quote]> = data.into();
        let key = CacheKey::new(symbol.as_str(), timestamp.as_str());

        let build_quotes = Arc::clone(&quotes);
        let (surface, built) = self
            .cache
            .get_or_build(key, || {
                let task = self
                    .pool
                    .submit(move || build_surface(&build_quotes, observed));
                async move { task.await? }
            })
            .await?;

        let evaluations = (0..quotes.len()).map(|i| {
            let quotes = Arc::clone(&quotes);
            let surface = Arc::clone(&surface);
            self.pool
                .submit(move || evaluate(&quotes[i], &surface, spot, rate, observed))
        });
        let results = try_join_all(evaluations)
            .await?
            .into_iter()
            .collect::<Result<Vec<ContractResult>, _>>()?;

        tracing::info!(contracts = results.len(), cache_hit = !built, "Snapshot processed");

        Ok(SnapshotResult {
            symbol,
            timestamp,
            results,
        })
    }
}
