//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::uuid_bson;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{ProfileChanges, User};
use crate::repository::UserRepository;

pub const COLLECTION: &str = "users";

pub struct MongoUserRepository {
    collection: Collection<User>,
}

fn bson_of<T: serde::Serialize>(value: &T) -> UserResult<Bson> {
    to_bson(value).map_err(|e| UserError::Database(e.to_string()))
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>(COLLECTION),
        }
    }

    /// Unique email and username, plus a sparse lookup index on the reset token
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_username_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "resetPasswordToken": 1 })
                .options(
                    IndexOptions::builder()
                        .sparse(true)
                        .name("idx_reset_token".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_bson(id) }
    }

    fn now() -> UserResult<Bson> {
        bson_of(&Utc::now())
    }

    async fn update_by_id(&self, id: Uuid, update: Document) -> UserResult<bool> {
        let result = self
            .collection
            .update_one(Self::id_filter(id), update)
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection.insert_one(&user).await?;
        tracing::info!("User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "username": username }).await?)
    }

    #[instrument(skip(self, token))]
    async fn get_by_reset_token(&self, token: &str) -> UserResult<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "resetPasswordToken": token })
            .await?)
    }

    #[instrument(skip(self, token))]
    async fn push_token(&self, id: Uuid, token: &str) -> UserResult<bool> {
        self.update_by_id(
            id,
            doc! { "$push": { "tokens": token }, "$set": { "updatedAt": Self::now()? } },
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn pull_token(&self, id: Uuid, token: &str) -> UserResult<bool> {
        self.update_by_id(
            id,
            doc! { "$pull": { "tokens": token }, "$set": { "updatedAt": Self::now()? } },
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> UserResult<bool> {
        self.update_by_id(
            id,
            doc! {
                "$set": {
                    "resetPasswordToken": token,
                    "resetPasswordExpires": bson_of(&expires)?,
                    "updatedAt": Self::now()?,
                }
            },
        )
        .await
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: Uuid, password_hash: &str) -> UserResult<bool> {
        self.update_by_id(
            id,
            doc! {
                "$set": { "password": password_hash, "updatedAt": Self::now()? },
                "$unset": { "resetPasswordToken": "", "resetPasswordExpires": "" },
            },
        )
        .await
    }

    #[instrument(skip(self, changes))]
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> UserResult<Option<User>> {
        let mut set = doc! {
            "name": changes.name,
            "dob": bson_of(&changes.dob)?,
            "updatedAt": Self::now()?,
        };
        if let Some(path) = changes.profile_pic {
            set.insert("profilePic", path);
        }

        let updated = self
            .collection
            .find_one_and_update(Self::id_filter(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn push_order(&self, id: Uuid, order_id: Uuid) -> UserResult<bool> {
        self.update_by_id(
            id,
            doc! { "$push": { "orders": uuid_bson(order_id) }, "$set": { "updatedAt": Self::now()? } },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(user_id = %id, "User deleted");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignupRequest;
    use chrono::NaiveDate;
    use mongodb::bson::to_raw_document_buf;

    fn user() -> User {
        let mut user = User::new(
            SignupRequest {
                username: format!("Mongo{}", Uuid::now_v7().simple()),
                email: format!("{}@example.com", Uuid::now_v7().simple()),
                password: "Secret1".to_string(),
                phone: "0123456789".to_string(),
            },
            "$argon2id$placeholder".to_string(),
        );
        user.orders.push(Uuid::now_v7());
        user.reset_password_expires = Some(Utc::now());
        user
    }

    fn stored(user: &User) -> Document {
        to_raw_document_buf(user).unwrap().to_document().unwrap()
    }

    #[test]
    fn test_filters_match_stored_encoding() {
        let user = user();
        let stored = stored(&user);

        let filter = MongoUserRepository::id_filter(user.id);
        assert_eq!(stored.get("_id"), filter.get("_id"));

        let orders = stored.get_array("orders").unwrap();
        assert_eq!(orders[0], uuid_bson(user.orders[0]));
    }

    #[test]
    fn test_updates_match_stored_types() {
        let mut user = user();
        user.dob = NaiveDate::from_ymd_opt(1990, 7, 15);
        let stored = stored(&user);

        let expires = bson_of(&Utc::now()).unwrap();
        assert_eq!(
            stored.get("resetPasswordExpires").unwrap().element_type(),
            expires.element_type()
        );

        let dob = bson_of(&user.dob.unwrap()).unwrap();
        assert_eq!(stored.get("dob").unwrap().element_type(), dob.element_type());
    }

    async fn test_db() -> Database {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(url).await.unwrap();
        client.database(&format!("users_test_{}", Uuid::now_v7().simple()))
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn test_round_trip_by_id() {
        let db = test_db().await;
        let repo = MongoUserRepository::new(&db);
        repo.init_indexes().await.unwrap();

        let user = repo.create(user()).await.unwrap();
        let found = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.email, user.email);
        assert_eq!(found.orders, user.orders);

        assert!(repo.push_token(user.id, "tok-1").await.unwrap());
        assert!(repo.push_token(user.id, "tok-2").await.unwrap());
        assert!(repo.pull_token(user.id, "tok-1").await.unwrap());

        let order_id = Uuid::now_v7();
        assert!(repo.push_order(user.id, order_id).await.unwrap());

        let found = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.tokens, vec!["tok-2".to_string()]);
        assert_eq!(found.orders.last(), Some(&order_id));

        let updated = repo
            .update_profile(
                user.id,
                ProfileChanges {
                    name: "Mongo User".to_string(),
                    dob: NaiveDate::from_ymd_opt(1990, 7, 15).unwrap(),
                    profile_pic: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Mongo User"));

        assert!(repo.set_reset_token(user.id, "reset", Utc::now()).await.unwrap());
        assert!(repo.get_by_reset_token("reset").await.unwrap().is_some());
        assert!(repo.update_password(user.id, "new-hash").await.unwrap());
        assert!(repo.get_by_reset_token("reset").await.unwrap().is_none());

        assert!(repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        assert!(!repo.push_token(user.id, "tok-3").await.unwrap());

        db.drop().await.unwrap();
    }
}
