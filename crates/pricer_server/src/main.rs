//! Realtime Greeks Server
//!
//! WebSocket and HTTP front end for the snapshot pipeline.

use anyhow::Context;
use clap::Parser;
use pricer_server::config::{build_config, CliArgs as ConfigCliArgs, LogFormat, LogLevel};
use pricer_server::server::Server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Realtime Greeks Server - option chain snapshots in, prices and Greeks out
#[derive(Parser, Debug)]
#[command(name = "pricer_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "GREEKS_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GREEKS_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GREEKS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, env = "GREEKS_LOG_FORMAT")]
    log_format: Option<String>,

    /// CPU worker threads
    #[arg(long, env = "GREEKS_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Maximum number of cached surfaces
    #[arg(long, env = "GREEKS_CACHE_CAPACITY")]
    cache_capacity: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "GREEKS_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Largest accepted HTTP snapshot body in bytes
    #[arg(long, env = "GREEKS_MAX_BODY_BYTES")]
    max_body_bytes: Option<usize>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            log_format: args.log_format,
            worker_threads: args.worker_threads,
            cache_capacity: args.cache_capacity,
            request_timeout_secs: args.request_timeout_secs,
            max_body_bytes: args.max_body_bytes,
        }
    }
}

fn init_tracing(log_level: LogLevel, log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_filter_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args).context("Failed to load configuration")?;

    init_tracing(config.log_level, config.log_format);

    tracing::info!("Realtime Greeks Server v{}", pricer_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        log_format = %config.log_format,
        worker_threads = config.worker_threads,
        cache_capacity = config.cache_capacity,
        request_timeout_secs = config.request_timeout_secs,
        max_body_bytes = config.max_body_bytes,
        "Server configuration loaded"
    );

    let server = Server::new(config).context("Failed to start snapshot pipeline")?;
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server
        .run()
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
