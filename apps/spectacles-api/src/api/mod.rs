//! API routes module

pub mod health;
pub mod orders;
pub mod spectacles;
pub mod users;

use axum::Router;
use domain_spectacles::MongoSpectacleRepository;
use domain_users::MongoUserRepository;
use std::sync::Arc;

use crate::state::AppState;

/// Create all API routes, relative to the versioned prefix.
///
/// Users and catalog repositories are shared with the orders service, which
/// links placed orders to their owner and looks up product names.
pub fn routes(state: &AppState) -> Router {
    let users = Arc::new(MongoUserRepository::new(&state.db));
    let spectacles = Arc::new(MongoSpectacleRepository::new(&state.db));

    Router::new()
        .merge(users::router(state, users.clone()))
        .nest("/spectacles", spectacles::router(spectacles.clone()))
        .nest("/orders", orders::router(state, users, spectacles))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    users::init_indexes(state).await?;
    spectacles::init_indexes(state).await?;
    orders::init_indexes(state).await
}
