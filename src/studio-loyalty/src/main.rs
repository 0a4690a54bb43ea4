//! Studio Loyalty — points ledger and tier engine for a service studio.
//!
//! Main entry point that wires the ledger, engines, and API server.

use clap::Parser;
use std::sync::Arc;
use studio_api::ApiServer;
use studio_core::config::AppConfig;
use studio_ledger::{ClientDirectory, LedgerStore};
use studio_loyalty::RewardEngine;
use studio_reporting::SummaryQuery;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "studio-loyalty-server")]
#[command(about = "Loyalty points ledger and tier engine")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "STUDIO_LOYALTY__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "STUDIO_LOYALTY__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "STUDIO_LOYALTY__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// Seed demo clients and bookings on startup
    #[arg(long, default_value_t = false)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_loyalty=info,studio_loyalty_server=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Studio Loyalty starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        tiers = config.loyalty.tier_thresholds.len(),
        "Configuration loaded"
    );

    // Wire the ledger and engines
    let directory = Arc::new(ClientDirectory::new());
    let store = Arc::new(LedgerStore::new(directory));
    let engine = Arc::new(RewardEngine::new(store.clone(), &config.loyalty));
    let summaries = Arc::new(SummaryQuery::new(store.clone(), &config.loyalty));

    if cli.seed_demo {
        store.seed_demo_data()?;
    }

    let server = ApiServer::new(config, store, engine, summaries);
    server.start_metrics().await?;
    server.start_http().await?;

    Ok(())
}
