// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::chart_service::ChartService;
use crate::application::timeline_controller::TimelineController;
use crate::application::timeline_observer::TracingObserver;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_chart_source::HttpChartSource;
use crate::infrastructure::http_period_source::HttpPeriodSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    collapse_node, get_outline, get_timeline, health_check, load_timeline, submit_chart, toggle_node,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let app_config = load_app_config()?;
    let timeout = Duration::from_secs(app_config.service.timeout_secs);

    // Create service clients (infrastructure layer)
    let period_source = Arc::new(HttpPeriodSource::new(&app_config.service.base_url, timeout)?);
    let chart_source = Arc::new(HttpChartSource::new(&app_config.service.base_url, timeout)?);

    // Create services (application layer)
    let timeline = Arc::new(TimelineController::new(period_source, Arc::new(TracingObserver)));
    let chart_service = ChartService::new(chart_source, timeline.clone());

    // Create application state
    let state = Arc::new(AppState {
        timeline,
        chart_service,
    });

    // Build router (presentation layer)
    // Responses are compressed by the handlers when the client accepts br
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/chart", post(submit_chart))
        .route("/timeline", get(get_timeline).post(load_timeline))
        .route("/timeline/outline", get(get_outline))
        .route("/timeline/nodes/:id/toggle", post(toggle_node))
        .route("/timeline/nodes/:id/collapse", post(collapse_node))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", app_config.server.bind_addr))?;
    tracing::info!(
        service = %app_config.service.base_url,
        "Starting dasha-timeline service on {}",
        addr
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
