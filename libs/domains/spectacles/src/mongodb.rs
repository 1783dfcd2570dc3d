//! MongoDB implementation of SpectacleRepository

use async_trait::async_trait;
use chrono::Utc;
use database::mongodb::{uuid_bson, uuids_bson};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{SpectacleError, SpectacleResult};
use crate::models::{Spectacle, SpectacleFilter, UpdateSpectacle};
use crate::repository::SpectacleRepository;

pub const COLLECTION: &str = "spectacles";

pub struct MongoSpectacleRepository {
    collection: Collection<Spectacle>,
}

fn bson_of<T: serde::Serialize>(value: &T) -> SpectacleResult<Bson> {
    to_bson(value).map_err(|e| SpectacleError::Database(e.to_string()))
}

impl MongoSpectacleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Spectacle>(COLLECTION),
        }
    }

    /// Compound index serving the catalog filter
    pub async fn init_indexes(&self) -> SpectacleResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "gender": 1, "category": 1, "price": 1 })
            .options(
                IndexOptions::builder()
                    .name("idx_gender_category_price".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Spectacle indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_bson(id) }
    }

    /// Build a MongoDB filter document from SpectacleFilter
    fn build_filter(filter: &SpectacleFilter) -> Document {
        let mut doc = doc! {};

        if let Some(gender) = filter.gender {
            doc.insert("gender", gender.to_string());
        }
        if let Some(category) = filter.category {
            doc.insert("category", category.to_string());
        }
        if let Some(range) = filter.price {
            doc.insert("price", doc! { "$gte": range.min, "$lte": range.max });
        }

        doc
    }

    fn build_update(update: &UpdateSpectacle) -> SpectacleResult<Document> {
        let mut set = doc! { "updatedAt": bson_of(&Utc::now())? };

        if let Some(ref name) = update.name {
            set.insert("name", name.as_str());
        }
        if let Some(gender) = update.gender {
            set.insert("gender", gender.to_string());
        }
        if let Some(price) = update.price {
            set.insert("price", price);
        }
        if let Some(category) = update.category {
            set.insert("category", category.to_string());
        }
        if let Some(ref image) = update.image {
            set.insert("image", image.as_str());
        }
        if let Some(ref description) = update.description {
            set.insert("description", description.as_str());
        }
        if let Some(stock) = update.stock {
            set.insert("stock", stock);
        }

        Ok(doc! { "$set": set })
    }
}

#[async_trait]
impl SpectacleRepository for MongoSpectacleRepository {
    #[instrument(skip(self, spectacle), fields(spectacle_id = %spectacle.id))]
    async fn create(&self, spectacle: Spectacle) -> SpectacleResult<Spectacle> {
        self.collection.insert_one(&spectacle).await?;
        tracing::info!("Spectacle created");
        Ok(spectacle)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> SpectacleResult<Option<Spectacle>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> SpectacleResult<Vec<Spectacle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": uuids_bson(ids) } };
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: SpectacleFilter) -> SpectacleResult<Vec<Spectacle>> {
        let cursor = self.collection.find(Self::build_filter(&filter)).await?;
        let spectacles: Vec<Spectacle> = cursor.try_collect().await?;
        tracing::debug!(count = spectacles.len(), "Listed spectacles");
        Ok(spectacles)
    }

    #[instrument(skip(self, update))]
    async fn update(
        &self,
        id: Uuid,
        update: UpdateSpectacle,
    ) -> SpectacleResult<Option<Spectacle>> {
        let updated = self
            .collection
            .find_one_and_update(Self::id_filter(id), Self::build_update(&update)?)
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(spectacle_id = %id, "Spectacle updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> SpectacleResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(spectacle_id = %id, "Spectacle deleted");
        }
        Ok(result.deleted_count > 0)
    }
}
