//! vitalboard — personal health metrics dashboard service.
//!
//! # Usage
//!
//! ```bash
//! # Run with the on-disk store (default: ./data)
//! vitalboard
//!
//! # Run against a specific database directory
//! vitalboard --data-dir /var/lib/vitalboard
//!
//! # Run fully in memory, seeded with synthetic demo data
//! vitalboard --ephemeral --seed-demo
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: logging level (default: info)
//! - `VITALBOARD_CONFIG`: path to a TOML config file
//! - `VITALBOARD_CORS_ORIGINS`: comma-separated allowed CORS origins

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use vitalboard::api::{create_app, ApiState};
use vitalboard::config::VitalboardConfig;
use vitalboard::demo;
use vitalboard::store::memory::MemoryStore;
use vitalboard::store::sled_store::SledStore;
use vitalboard::store::HealthDataStore;

#[derive(Parser, Debug)]
#[command(name = "vitalboard")]
#[command(about = "Personal health metrics dashboard service")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides the default search order)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Database directory for the sled store
    #[arg(long, value_name = "DIR", default_value = "./data")]
    data_dir: String,

    /// Use an in-memory store instead of sled (nothing persists)
    #[arg(long)]
    ephemeral: bool,

    /// Seed the store with synthetic demo data on startup
    #[arg(long)]
    seed_demo: bool,

    /// Days of demo data to generate with --seed-demo
    #[arg(long, default_value = "90")]
    demo_days: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&text).with_context(|| format!("parsing config file {path}"))?
        }
        None => VitalboardConfig::load(),
    };
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }

    let store: Arc<dyn HealthDataStore> = if args.ephemeral {
        info!("Using in-memory store (nothing will persist)");
        Arc::new(MemoryStore::new())
    } else {
        info!(path = %args.data_dir, "Opening sled store");
        Arc::new(SledStore::open(&args.data_dir).context("opening sled database")?)
    };

    if args.seed_demo {
        demo::seed(store.as_ref(), Local::now().date_naive(), args.demo_days)
            .context("seeding demo data")?;
    }

    let addr = config.server.addr.clone();
    let state = ApiState::new(store, Arc::new(config));
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %addr, "vitalboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}
