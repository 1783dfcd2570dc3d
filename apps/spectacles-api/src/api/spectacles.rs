//! Catalog routes

use axum::Router;
use domain_spectacles::{MongoSpectacleRepository, SpectacleService, handlers};
use std::sync::Arc;

use crate::state::AppState;

/// Create spectacles router
pub fn router(repository: Arc<MongoSpectacleRepository>) -> Router {
    handlers::router(Arc::new(SpectacleService::new(repository)))
}

/// Initialize spectacles indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoSpectacleRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
