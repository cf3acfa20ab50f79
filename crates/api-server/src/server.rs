//! API server: HTTP (REST) endpoints and the Prometheus exporter.

use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use kol_allocator::Engine;
use kol_core::config::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    engine: Arc<Engine>,
}

impl ApiServer {
    pub fn new(config: AppConfig, engine: Arc<Engine>) -> Self {
        Self { config, engine }
    }

    /// Routes and middleware, without binding a socket.
    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
            max_content_units: self.config.planner.max_content_units,
        };

        Router::new()
            // Planning endpoints
            .route("/v1/plan/single", post(rest::plan_single))
            .route("/v1/plan/segments", post(rest::plan_segments))
            .route("/v1/plan/template/:name", post(rest::plan_template))
            .route("/v1/catalog", get(rest::catalog))
            .route("/v1/templates", get(rest::templates))
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

        let addr = SocketAddr::new(
            self.config.api.host.parse()?,
            self.config.api.http_port,
        );

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
