// ABOUTME: Starts the Planboard HTTP server on the loopback interface
// ABOUTME: Opens the store, attaches CORS for the configured origin and serves the API router

use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use planboard_projects::PlanningService;

use crate::config::{Config, ConfigError};

pub fn cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any))
}

/// The API router with CORS applied.
pub fn build_app(service: PlanningService, config: &Config) -> Result<Router, ConfigError> {
    Ok(planboard_api::create_router(service).layer(cors_layer(&config.cors_origin)?))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let service = PlanningService::open(config.store_config())
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    info!("Using database {}", service.store().path().display());

    let app = build_app(service.clone(), &config)?;

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Planboard API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.store().close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_origin() {
        assert!(cors_layer("http://localhost:5173").is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_unprintable_origin() {
        assert!(matches!(
            cors_layer("http://bad\norigin"),
            Err(ConfigError::InvalidCorsOrigin(_))
        ));
    }
}
