//! MongoDB implementation of OrderRepository

use async_trait::async_trait;
use chrono::Utc;
use database::mongodb::uuid_bson;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderStatus};
use crate::repository::OrderRepository;

pub const COLLECTION: &str = "orders";

pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

fn bson_of<T: serde::Serialize>(value: &T) -> OrderResult<Bson> {
    to_bson(value).map_err(|e| OrderError::Database(e.to_string()))
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Order>(COLLECTION),
        }
    }

    /// Serves the per-user listing; v7 ids sort by creation time
    pub async fn init_indexes(&self) -> OrderResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "userId": 1, "_id": -1 })
            .options(
                IndexOptions::builder()
                    .name("idx_user_created".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Order indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_bson(id) }
    }

    fn user_filter(user_id: Uuid) -> Document {
        doc! { "userId": uuid_bson(user_id) }
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id, user_id = %order.user_id))]
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.collection.insert_one(&order).await?;
        tracing::info!("Order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        let cursor = self
            .collection
            .find(Self::user_filter(user_id))
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>> {
        let update = doc! {
            "$set": {
                "status": status.to_string(),
                "updatedAt": bson_of(&Utc::now())?,
            }
        };
        let updated = self
            .collection
            .find_one_and_update(Self::id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(order_id = %id, %status, "Order status changed");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> OrderResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }
}
