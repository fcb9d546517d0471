//! API Gateway Library
//!
//! This crate provides the HTTP REST API over the account and auth services.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use account_service_lib::{build_service, infra::Database};
use auth_service_lib::{AccessPolicy, JwtTokenService, TokenConfig, TokenService};
use domain::Argon2Hasher;

use crate::config::AppConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Connect to the database, wire the services and serve HTTP until Ctrl-C.
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database.url).await?;

    let hasher = Arc::new(Argon2Hasher::new(config.hasher.cost));
    let tokens: Arc<dyn TokenService> =
        Arc::new(JwtTokenService::new(TokenConfig::from(&config.jwt))?);
    let accounts = build_service(db.get_connection(), hasher, tokens.clone());

    let state = AppState::new(accounts, AccessPolicy::new(tokens)).with_database(db);

    let app = create_router(state, &config.cors).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
