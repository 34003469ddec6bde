//! Tourism API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use tourism_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_services::{Startup, build_app_state, spawn_rate_limit_sweeper};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let app_state = match build_app_state(&config).await? {
        Startup::MigratedOnly => return Ok(()),
        Startup::Serve(app_state) => app_state,
    };

    spawn_rate_limit_sweeper(
        app_state.rate_limiter.clone(),
        config.rate_limit_sweep_interval,
    );

    let app = api_router::build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "tourism-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
