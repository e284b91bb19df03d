//! Bounded CPU worker pool for surface builds and contract evaluation.
//!
//! [`WorkerPool`] owns a dedicated rayon thread pool. Each submitted closure
//! runs on one worker thread and reports back through a `tokio` oneshot
//! channel, so async coordinators can await CPU work without blocking the
//! runtime.
//!
//! # Design Goals
//!
//! - **Bounded**: A fixed number of threads regardless of request volume
//! - **Panic containment**: A panicking task becomes an error, the worker survives
//! - **Detached completion**: Dropping the returned future does not cancel the
//!   task; its result is discarded
//!
//! # Example
//!
//! ```rust
//! use pricer_pricing::pool::WorkerPool;
//!
//! let pool = WorkerPool::new(2).unwrap();
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//!
//! let value = rt.block_on(pool.submit(|| 6 * 7)).unwrap();
//! assert_eq!(value, 42);
//! ```

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use tokio::sync::oneshot;

use crate::error::PipelineError;

/// Default number of worker threads.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Fixed-size pool of CPU worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Creates a pool with `threads` workers.
    ///
    /// # Errors
    /// `PipelineError::WorkerFailed` if `threads` is zero or the threads
    /// cannot be spawned.
    pub fn new(threads: usize) -> Result<Self, PipelineError> {
        if threads == 0 {
            return Err(PipelineError::WorkerFailed(
                "worker pool needs at least one thread".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("greeks-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::WorkerFailed(e.to_string()))?;

        tracing::debug!(threads, "Worker pool started");
        Ok(Self { pool, threads })
    }

    /// Number of worker threads.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `task` on a worker thread.
    ///
    /// The task starts immediately; the returned future only waits for its
    /// result.
    ///
    /// # Errors
    /// The future resolves to `PipelineError::WorkerFailed` if the task
    /// panicked.
    pub fn submit<F, R>(
        &self,
        task: F,
    ) -> impl Future<Output = Result<R, PipelineError>> + Send + 'static
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task));
            // The receiver is gone when the request was abandoned
            let _ = tx.send(outcome);
        });

        async move {
            match rx.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(payload)) => Err(PipelineError::WorkerFailed(panic_message(&*payload))),
                Err(_) => Err(PipelineError::WorkerFailed(
                    "worker dropped the task".to_string(),
                )),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("task panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("task panicked: {}", msg)
    } else {
        "task panicked".to_string()
    }
}
