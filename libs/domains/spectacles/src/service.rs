//! Catalog business rules

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{SpectacleError, SpectacleResult};
use crate::models::{CreateSpectacle, Spectacle, SpectacleFilter, SpectacleQuery, UpdateSpectacle};
use crate::repository::SpectacleRepository;

pub struct SpectacleService<R: SpectacleRepository> {
    repository: Arc<R>,
}

impl<R: SpectacleRepository> SpectacleService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Parse the raw query and return every match
    #[instrument(skip(self))]
    pub async fn list_spectacles(&self, query: SpectacleQuery) -> SpectacleResult<Vec<Spectacle>> {
        let filter = SpectacleFilter::try_from(query)?;
        self.repository.list(filter).await
    }

    #[instrument(skip(self))]
    pub async fn get_spectacle(&self, id: Uuid) -> SpectacleResult<Spectacle> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(SpectacleError::NotFound)
    }

    #[instrument(skip(self, input))]
    pub async fn create_spectacle(&self, input: CreateSpectacle) -> SpectacleResult<Spectacle> {
        input.validate()?;
        let spectacle = Spectacle::try_from(input)?;
        self.repository.create(spectacle).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_spectacle(
        &self,
        id: Uuid,
        update: UpdateSpectacle,
    ) -> SpectacleResult<Spectacle> {
        update.validate()?;
        self.repository
            .update(id, update)
            .await?
            .ok_or(SpectacleError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete_spectacle(&self, id: Uuid) -> SpectacleResult<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(SpectacleError::NotFound)
        }
    }
}
