// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::poller::SnapshotPoller;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::HttpRecordSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    clear_selection, export_snapshot, filter_last_days, get_dashboard, health_check, reset_zoom,
    select_point, set_range, zoom,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("response_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config().context("failed to load configuration")?;

    // Create record source (infrastructure layer)
    let source = Arc::new(HttpRecordSource::new(
        config.source.url.clone(),
        config.source.timeout(),
    )?);

    // Create services (application layer)
    let dashboard = DashboardService::new(
        config.window.to_settings(),
        config.selection.highlight_duration(),
    );
    let poller = SnapshotPoller::new(source, dashboard.shared_state(), config.source.poll_interval()).spawn();

    // Create application state
    let state = Arc::new(AppState {
        dashboard,
        export_file_name: config.export.file_name.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/zoom", post(zoom))
        .route("/dashboard/reset", post(reset_zoom))
        .route("/dashboard/last-days", post(filter_last_days))
        .route("/dashboard/range", post(set_range))
        .route("/dashboard/select", post(select_point).delete(clear_selection))
        .route("/export", get(export_snapshot))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting response-dashboard on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    poller.shutdown().await;
    tracing::info!("Shut down");
    Ok(())
}
