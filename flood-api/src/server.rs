//! API Server setup

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::{init_metrics, MetricsConfig};
use crate::router::create_router;
use crate::state::AppState;
use crate::ServerConfig;

/// Build the router with tracing and CORS around `state`
pub fn create_server(state: AppState, enable_cors: bool) -> Router {
    let router = create_router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Open the store, install metrics and serve until Ctrl-C
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut state = AppState::from_config(&config).await?;
    if let Some(handle) = init_metrics(&MetricsConfig::from_env())? {
        state = state.with_metrics(handle);
    }

    let store = state.store.clone();
    let router = create_server(state, config.enable_cors);
    let addr: SocketAddr = config.bind_address().parse()?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, version = crate::VERSION, "Flood Watch API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Flood Watch API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
