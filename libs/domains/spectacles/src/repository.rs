use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::SpectacleResult;
use crate::models::{Spectacle, SpectacleFilter, UpdateSpectacle};

/// Repository trait for catalog persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpectacleRepository: Send + Sync {
    async fn create(&self, spectacle: Spectacle) -> SpectacleResult<Spectacle>;

    async fn get_by_id(&self, id: Uuid) -> SpectacleResult<Option<Spectacle>>;

    /// Fetch several records at once; unknown ids are skipped
    async fn get_many(&self, ids: &[Uuid]) -> SpectacleResult<Vec<Spectacle>>;

    /// All records matching the filter, in storage order
    async fn list(&self, filter: SpectacleFilter) -> SpectacleResult<Vec<Spectacle>>;

    /// Merge `update` into the record; `None` when the id is unknown
    async fn update(&self, id: Uuid, update: UpdateSpectacle)
    -> SpectacleResult<Option<Spectacle>>;

    async fn delete(&self, id: Uuid) -> SpectacleResult<bool>;
}

/// In-memory implementation of SpectacleRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemorySpectacleRepository {
    spectacles: Arc<RwLock<HashMap<Uuid, Spectacle>>>,
}

impl InMemorySpectacleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpectacleRepository for InMemorySpectacleRepository {
    async fn create(&self, spectacle: Spectacle) -> SpectacleResult<Spectacle> {
        let mut spectacles = self.spectacles.write().await;
        spectacles.insert(spectacle.id, spectacle.clone());
        Ok(spectacle)
    }

    async fn get_by_id(&self, id: Uuid) -> SpectacleResult<Option<Spectacle>> {
        let spectacles = self.spectacles.read().await;
        Ok(spectacles.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> SpectacleResult<Vec<Spectacle>> {
        let spectacles = self.spectacles.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| spectacles.get(id).cloned())
            .collect())
    }

    async fn list(&self, filter: SpectacleFilter) -> SpectacleResult<Vec<Spectacle>> {
        let spectacles = self.spectacles.read().await;
        let mut matched: Vec<Spectacle> = spectacles
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        // v7 ids sort by insertion time
        matched.sort_by_key(|s| s.id);
        Ok(matched)
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateSpectacle,
    ) -> SpectacleResult<Option<Spectacle>> {
        let mut spectacles = self.spectacles.write().await;
        Ok(spectacles.get_mut(&id).map(|spectacle| {
            spectacle.apply_update(update);
            spectacle.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> SpectacleResult<bool> {
        let mut spectacles = self.spectacles.write().await;
        Ok(spectacles.remove(&id).is_some())
    }
}
