//! Spectacles API - storefront REST server

use axum_helpers::JwtAuth;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use email::NotificationService;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let mongo_client =
        database::mongodb::connect_with_retry(&config.mongodb, RetryConfig::default()).await?;
    let db = mongo_client.database(&config.mongodb.database);

    let notifications = NotificationService::from_env()?;
    let jwt = JwtAuth::new(&config.jwt);

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
        jwt,
        notifications,
    };

    api::init_indexes(&state).await?;

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &state.config.cors);
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.mongo_client.clone()));

    info!(
        name = state.config.app.name,
        version = state.config.app.version,
        "Starting Spectacles API on port {}",
        state.config.server.port
    );

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            drop(state.mongo_client);
            info!("MongoDB connection closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Spectacles API shutdown complete");
    Ok(())
}
