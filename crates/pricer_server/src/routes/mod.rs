//! Route modules for the pricer server
//!
//! This module contains endpoint group-specific routers:
//! - greeks: Snapshot Greeks over HTTP JSON
//! - ws: Snapshot Greeks over WebSocket
//! - health: Health check and readiness endpoints

pub mod greeks;
pub mod health;
pub mod ws;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, Request};
use axum::Router;
use pricer_pricing::{PipelineConfig, PipelineError, SnapshotPipeline, SnapshotResult};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Snapshot engine shared by every connection
    pub pipeline: Arc<SnapshotPipeline>,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with a pipeline sized from the configuration
    pub fn new(config: Arc<ServerConfig>) -> Result<Self, PipelineError> {
        let pipeline = SnapshotPipeline::new(PipelineConfig {
            worker_threads: config.worker_threads,
            cache_capacity: config.cache_capacity,
        })?;

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            start_time: Instant::now(),
        })
    }

    /// Process one raw JSON snapshot within the request deadline
    pub async fn process(&self, raw: &str) -> Result<SnapshotResult, ApiError> {
        let result = with_timeout(
            self.config.request_timeout(),
            self.pipeline.process_json(raw),
        )
        .await?;
        Ok(result?)
    }
}

/// Run `fut`, failing with [`ApiError::Timeout`] once `limit` has elapsed.
///
/// The future is dropped on timeout; worker tasks it already submitted run
/// to completion and their results are discarded.
pub async fn with_timeout<F, T>(limit: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ApiError::Timeout(limit.as_secs()))
}

/// Build the main application router by merging all route modules
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .merge(health::routes())
        .merge(greeks::routes())
        .merge(ws::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    %request_id
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) fn test_state(config: ServerConfig) -> AppState {
    AppState::new(Arc::new(config)).unwrap()
}
