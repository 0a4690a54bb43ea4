//! API server — HTTP surface plus the Prometheus metrics exporter.

use crate::loyalty_rest;
use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use studio_core::config::AppConfig;
use studio_ledger::LedgerStore;
use studio_loyalty::RewardEngine;
use studio_reporting::SummaryQuery;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Main API server for the loyalty engine.
pub struct ApiServer {
    config: AppConfig,
    store: Arc<LedgerStore>,
    engine: Arc<RewardEngine>,
    summaries: Arc<SummaryQuery>,
}

impl ApiServer {
    pub fn new(
        config: AppConfig,
        store: Arc<LedgerStore>,
        engine: Arc<RewardEngine>,
        summaries: Arc<SummaryQuery>,
    ) -> Self {
        Self {
            config,
            store,
            engine,
            summaries,
        }
    }

    /// Build the router with all loyalty and operational routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            engine: self.engine.clone(),
            summaries: self.summaries.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };

        Router::new()
            // Loyalty endpoints
            .route("/v1/loyalty/summaries", get(loyalty_rest::handle_summaries))
            .route(
                "/v1/loyalty/standing/:client_id",
                get(loyalty_rest::handle_standing),
            )
            .route("/v1/loyalty/rewards", post(loyalty_rest::handle_issue_reward))
            .route(
                "/v1/loyalty/bookings/completed",
                post(loyalty_rest::handle_booking_completed),
            )
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the handle alive
        std::mem::forget(handle);
        Ok(())
    }
}
