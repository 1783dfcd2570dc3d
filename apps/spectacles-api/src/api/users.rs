//! Account routes

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};
use std::sync::Arc;

use crate::state::AppState;

/// Create users router
pub fn router(state: &AppState, repository: Arc<MongoUserRepository>) -> Router {
    let service = UserService::new(
        repository,
        state.jwt.clone(),
        state.notifications.clone(),
        state.config.users.clone(),
    );
    handlers::router(Arc::new(service))
}

/// Initialize users indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoUserRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
