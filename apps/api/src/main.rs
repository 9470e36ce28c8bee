mod actions;
mod clock;
mod config;
mod errors;
mod extract;
mod lists;
mod models;
mod notify;
mod routes;
mod seed;
mod state;
mod support;
mod tasks;
mod templates;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::SystemClock;
use crate::config::Config;
use crate::lists::clipboard::MemoryClipboard;
use crate::notify::NotificationRelay;
use crate::routes::build_router;
use crate::seed::load_workspace;
use crate::state::AppState;
use crate::support::SimulatedDesk;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EverLeads API v{}", env!("CARGO_PKG_VERSION"));

    let workspace = load_workspace(&config)?;
    info!(
        "Workspace ready: {} prospects, {} outbounds, {} discarded",
        workspace.lists.prospects.len(),
        workspace.lists.outbounds.len(),
        workspace.lists.discarded.len()
    );

    // One relay for the whole process; torn down after the server stops.
    let relay = NotificationRelay::new(config.notification_ttl);
    let log_subscription = relay.subscribe(|live| {
        tracing::debug!("{} live notifications", live.len());
    });

    let state = AppState::new(
        workspace,
        relay.clone(),
        Arc::new(SystemClock),
        Arc::new(MemoryClipboard::default()),
        Arc::new(SimulatedDesk::new(config.support_submit_delay)),
        config.clone(),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    relay.unsubscribe(log_subscription);
    relay.shutdown();
    Ok(())
}
