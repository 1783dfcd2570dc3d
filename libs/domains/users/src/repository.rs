use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{ProfileChanges, User};

/// Repository trait for User persistence
///
/// Mutations that report `bool` return whether a user matched the id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; duplicate email or username is an error
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Lookup by reset token only; expiry is checked by the caller
    async fn get_by_reset_token(&self, token: &str) -> UserResult<Option<User>>;

    /// Append a session token
    async fn push_token(&self, id: Uuid, token: &str) -> UserResult<bool>;

    /// Remove exactly this session token
    async fn pull_token(&self, id: Uuid, token: &str) -> UserResult<bool>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> UserResult<bool>;

    /// Store a new hash and clear both reset fields
    async fn update_password(&self, id: Uuid, password_hash: &str) -> UserResult<bool>;

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> UserResult<Option<User>>;

    /// Append an order reference
    async fn push_order(&self, id: Uuid, order_id: Uuid) -> UserResult<bool>;

    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<F>(&self, id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                f(user);
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail);
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::DuplicateUsername);
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn get_by_reset_token(&self, token: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reset_password_token.as_deref() == Some(token))
            .cloned())
    }

    async fn push_token(&self, id: Uuid, token: &str) -> UserResult<bool> {
        Ok(self.modify(id, |u| u.tokens.push(token.to_string())).await)
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> UserResult<bool> {
        Ok(self.modify(id, |u| u.tokens.retain(|t| t != token)).await)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> UserResult<bool> {
        Ok(self
            .modify(id, |u| {
                u.reset_password_token = Some(token.to_string());
                u.reset_password_expires = Some(expires);
            })
            .await)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> UserResult<bool> {
        Ok(self
            .modify(id, |u| {
                u.password_hash = password_hash.to_string();
                u.reset_password_token = None;
                u.reset_password_expires = None;
            })
            .await)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> UserResult<Option<User>> {
        self.modify(id, |u| {
            u.name = Some(changes.name);
            u.dob = Some(changes.dob);
            if let Some(path) = changes.profile_pic {
                u.profile_pic = Some(path);
            }
        })
        .await;
        self.get_by_id(id).await
    }

    async fn push_order(&self, id: Uuid, order_id: Uuid) -> UserResult<bool> {
        Ok(self.modify(id, |u| u.orders.push(order_id)).await)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let removed = self.users.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(removed)
    }
}
