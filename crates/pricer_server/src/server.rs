//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port
//! and graceful shutdown.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use pricer_pricing::PipelineError;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes::{self, AppState};

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance with the given configuration
    pub fn new(config: ServerConfig) -> Result<Self, PipelineError> {
        let config = Arc::new(config);
        let state = AppState::new(Arc::clone(&config))?;
        let router = routes::build_router(state);

        Ok(Self { config, router })
    }

    /// Get the address string the server will bind to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server until Ctrl-C
    ///
    /// This is the main entry point for starting the server.
    /// It binds to the configured host/port and serves requests.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        self.run_with_listener(listener, shutdown_signal()).await
    }

    /// Run the server on an existing listener until `shutdown` resolves
    ///
    /// In-flight requests are allowed to finish once shutdown starts.
    pub async fn run_with_listener<S>(
        self,
        listener: TcpListener,
        shutdown: S,
    ) -> Result<(), std::io::Error>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "Server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
