//! Order routes

use axum::Router;
use domain_orders::{MongoOrderRepository, OrderService, handlers};
use domain_spectacles::MongoSpectacleRepository;
use domain_users::MongoUserRepository;
use std::sync::Arc;

use crate::state::AppState;

/// Create orders router
pub fn router(
    state: &AppState,
    users: Arc<MongoUserRepository>,
    spectacles: Arc<MongoSpectacleRepository>,
) -> Router {
    let orders = Arc::new(MongoOrderRepository::new(&state.db));
    handlers::router(Arc::new(OrderService::new(orders, users, spectacles)))
}

/// Initialize orders indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoOrderRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
