//! Greeks Client
//!
//! Sends option chain snapshots to a running server over WebSocket and prints
//! each reply. By default the two static NIFTY snapshots are replayed; with
//! `--live` a synthetic jittered feed is streamed instead.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pricer_server::client::{static_snapshots, GreeksClient, SyntheticFeed};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Greeks Client - replay snapshots against a Greeks server
#[derive(Parser, Debug)]
#[command(name = "greeks_client")]
#[command(version, about, long_about = None)]
struct Args {
    /// Server WebSocket URL
    #[arg(long, default_value = "ws://127.0.0.1:8765/ws")]
    url: String,

    /// Stream a synthetic live feed instead of the static snapshots
    #[arg(long)]
    live: bool,

    /// Pause between snapshots in milliseconds
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Stop the live feed after this many snapshots
    #[arg(long)]
    count: Option<usize>,

    /// Seed for a reproducible live feed
    #[arg(long)]
    seed: Option<u64>,
}

fn print_reply(timestamp: &Value, reply: &str) {
    println!("Received Greeks @ {}:", timestamp);
    match serde_json::from_str::<Value>(reply) {
        Ok(value) => println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| reply.to_string())
        ),
        Err(_) => println!("{}", reply),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let interval = Duration::from_millis(args.interval_ms);

    let mut client = GreeksClient::connect(&args.url)
        .await
        .with_context(|| format!("Failed to connect to {}", args.url))?;

    if args.live {
        tracing::info!("Streaming synthetic live feed");
        let mut feed = match args.seed {
            Some(seed) => SyntheticFeed::seeded(seed),
            None => SyntheticFeed::new(),
        };
        let mut sent = 0;
        while args.count.map_or(true, |count| sent < count) {
            let snapshot = feed.next_snapshot();
            let reply = client
                .request(&snapshot.to_string())
                .await
                .context("Snapshot request failed")?;
            print_reply(&snapshot["timestamp"], &reply);
            sent += 1;
            tokio::time::sleep(interval).await;
        }
    } else {
        tracing::info!("Replaying static snapshots");
        for snapshot in static_snapshots() {
            let reply = client
                .request(&snapshot.to_string())
                .await
                .context("Snapshot request failed")?;
            print_reply(&snapshot["timestamp"], &reply);
            tokio::time::sleep(interval).await;
        }
    }

    client.close().await.context("Failed to close session")?;
    Ok(())
}
