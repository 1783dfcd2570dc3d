//! Order workflow across the order, user and catalog stores

use domain_spectacles::SpectacleRepository;
use domain_users::{UserRepository, UserResponse};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};
use crate::models::{CreateOrder, Order, OrderStatus, OrderWithUser, UserOrder};
use crate::repository::OrderRepository;

pub struct OrderService<O, U, P>
where
    O: OrderRepository,
    U: UserRepository,
    P: SpectacleRepository,
{
    orders: Arc<O>,
    users: Arc<U>,
    spectacles: Arc<P>,
}

impl<O, U, P> OrderService<O, U, P>
where
    O: OrderRepository,
    U: UserRepository,
    P: SpectacleRepository,
{
    pub fn new(orders: Arc<O>, users: Arc<U>, spectacles: Arc<P>) -> Self {
        Self {
            orders,
            users,
            spectacles,
        }
    }

    /// Persist a Pending order and reference it from its owner.
    ///
    /// If the owner cannot be updated afterwards, the order is deleted again
    /// so no order is left without a back-reference.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_order(&self, input: CreateOrder) -> OrderResult<Order> {
        input.validate()?;

        if self.users.get_by_id(input.user_id).await?.is_none() {
            return Err(OrderError::UserNotFound);
        }

        let order = self.orders.create(Order::new(input)).await?;

        let link_error = match self.users.push_order(order.user_id, order.id).await {
            Ok(true) => None,
            Ok(false) => Some(OrderError::UserNotFound),
            Err(e) => Some(OrderError::User(e)),
        };

        match link_error {
            None => {
                tracing::info!(order_id = %order.id, "Order placed");
                Ok(order)
            }
            Some(err) => {
                self.compensate(order.id).await;
                Err(err)
            }
        }
    }

    async fn compensate(&self, order_id: Uuid) {
        match self.orders.delete(order_id).await {
            Ok(_) => tracing::warn!(%order_id, "Rolled back order after failing to link it to its user"),
            Err(e) => tracing::error!(%order_id, error = %e, "Failed to roll back unlinked order"),
        }
    }

    /// A user's orders, newest first, with product names attached
    #[instrument(skip(self))]
    pub async fn list_user_orders(&self, user_id: Uuid) -> OrderResult<Vec<UserOrder>> {
        let orders = self.orders.list_by_user(user_id).await?;
        if orders.is_empty() {
            return Err(OrderError::NoOrdersForUser);
        }

        let product_ids: Vec<Uuid> = orders
            .iter()
            .flat_map(|o| o.items.iter().map(|item| item.product_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let names: HashMap<Uuid, Option<String>> = self
            .spectacles
            .get_many(&product_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| UserOrder::from_order(order, &names))
            .collect())
    }

    /// An order with its owner's public record
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> OrderResult<OrderWithUser> {
        let order = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let user = self
            .users
            .get_by_id(order.user_id)
            .await?
            .map(UserResponse::from);

        Ok(OrderWithUser { order, user })
    }

    /// Mark an order Cancelled whatever its current status
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: Uuid) -> OrderResult<Order> {
        self.orders
            .set_status(id, OrderStatus::Cancelled)
            .await?
            .ok_or(OrderError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderItem, ShippingAddress};
    use crate::repository::{InMemoryOrderRepository, MockOrderRepository};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use domain_spectacles::{
        Category, CreateSpectacle, Gender, InMemorySpectacleRepository, Spectacle,
    };
    use domain_users::models::ProfileChanges;
    use domain_users::{InMemoryUserRepository, SignupRequest, User, UserError, UserResult};
    use mockall::mock;

    mock! {
        pub Users {}

        #[async_trait]
        impl UserRepository for Users {
            async fn create(&self, user: User) -> UserResult<User>;
            async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;
            async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;
            async fn get_by_username(&self, username: &str) -> UserResult<Option<User>>;
            async fn get_by_reset_token(&self, token: &str) -> UserResult<Option<User>>;
            async fn push_token(&self, id: Uuid, token: &str) -> UserResult<bool>;
            async fn pull_token(&self, id: Uuid, token: &str) -> UserResult<bool>;
            async fn set_reset_token(
                &self,
                id: Uuid,
                token: &str,
                expires: DateTime<Utc>,
            ) -> UserResult<bool>;
            async fn update_password(&self, id: Uuid, password_hash: &str) -> UserResult<bool>;
            async fn update_profile(
                &self,
                id: Uuid,
                changes: ProfileChanges,
            ) -> UserResult<Option<User>>;
            async fn push_order(&self, id: Uuid, order_id: Uuid) -> UserResult<bool>;
            async fn delete(&self, id: Uuid) -> UserResult<bool>;
        }
    }

    fn user() -> User {
        User::new(
            SignupRequest {
                username: "Buyer1".into(),
                email: "buyer@example.com".into(),
                password: "Secret1".into(),
                phone: "0123456789".into(),
            },
            "$argon2id$placeholder".into(),
        )
    }

    fn order_input(user_id: Uuid, product_ids: &[Uuid]) -> CreateOrder {
        CreateOrder {
            user_id,
            items: product_ids
                .iter()
                .map(|id| OrderItem {
                    product_id: *id,
                    quantity: 1,
                    price: 25.0,
                })
                .collect(),
            total_amount: 25.0 * product_ids.len() as f64,
            discount_amount: Some(5.0),
            gift_card_amount: None,
            shipping_address: ShippingAddress {
                full_name: "Buyer One".into(),
                street: "1 Main St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                postal_code: "62701".into(),
                country: "US".into(),
                phone: "0123456789".into(),
            },
            payment_method: "card".into(),
        }
    }

    struct Fixture {
        service: OrderService<InMemoryOrderRepository, InMemoryUserRepository, InMemorySpectacleRepository>,
        orders: InMemoryOrderRepository,
        users: InMemoryUserRepository,
        spectacles: InMemorySpectacleRepository,
    }

    fn fixture() -> Fixture {
        let orders = InMemoryOrderRepository::new();
        let users = InMemoryUserRepository::new();
        let spectacles = InMemorySpectacleRepository::new();
        Fixture {
            service: OrderService::new(
                Arc::new(orders.clone()),
                Arc::new(users.clone()),
                Arc::new(spectacles.clone()),
            ),
            orders,
            users,
            spectacles,
        }
    }

    async fn catalog_item(repo: &InMemorySpectacleRepository, name: &str) -> Spectacle {
        let spectacle = Spectacle::try_from(CreateSpectacle {
            name: Some(name.into()),
            gender: Some(Gender::Female),
            price: Some(25),
            category: Some(Category::Eyeglasses),
            image: Some("/img/frame.png".into()),
            ..Default::default()
        })
        .unwrap();
        repo.create(spectacle).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_order_links_user() {
        let f = fixture();
        let owner = f.users.create(user()).await.unwrap();

        let order = f
            .service
            .create_order(order_input(owner.id, &[Uuid::now_v7()]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.discount_amount, 5.0);
        assert_eq!(order.gift_card_amount, 0.0);

        let owner = f.users.get_by_id(owner.id).await.unwrap().unwrap();
        assert_eq!(owner.orders, vec![order.id]);
        assert!(f.orders.get_by_id(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_order_unknown_user_persists_nothing() {
        let mut orders = MockOrderRepository::new();
        orders.expect_create().never();

        let service = OrderService::new(
            Arc::new(orders),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemorySpectacleRepository::new()),
        );

        let result = service
            .create_order(order_input(Uuid::now_v7(), &[Uuid::now_v7()]))
            .await;
        assert!(matches!(result, Err(OrderError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_create_order_rolls_back_when_link_fails() {
        let owner = user();
        let owner_id = owner.id;

        let mut users = MockUsers::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        users
            .expect_push_order()
            .times(1)
            .returning(|_, _| Err(UserError::Database("write conflict".into())));

        let orders = InMemoryOrderRepository::new();
        let service = OrderService::new(
            Arc::new(orders.clone()),
            Arc::new(users),
            Arc::new(InMemorySpectacleRepository::new()),
        );

        let result = service
            .create_order(order_input(owner_id, &[Uuid::now_v7()]))
            .await;
        assert!(matches!(result, Err(OrderError::User(UserError::Database(_)))));
        assert!(orders.list_by_user(owner_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_rolls_back_when_user_vanishes() {
        let owner = user();
        let owner_id = owner.id;

        let mut users = MockUsers::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        users.expect_push_order().returning(|_, _| Ok(false));

        let mut orders = MockOrderRepository::new();
        orders.expect_create().returning(|order| Ok(order));
        orders.expect_delete().times(1).returning(|_| Ok(true));

        let service = OrderService::new(
            Arc::new(orders),
            Arc::new(users),
            Arc::new(InMemorySpectacleRepository::new()),
        );

        let result = service
            .create_order(order_input(owner_id, &[Uuid::now_v7()]))
            .await;
        assert!(matches!(result, Err(OrderError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_create_order_validates_input() {
        let f = fixture();
        let owner = f.users.create(user()).await.unwrap();

        let result = f.service.create_order(order_input(owner.id, &[])).await;
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_user_orders_attaches_product_names() {
        let f = fixture();
        let owner = f.users.create(user()).await.unwrap();
        let frame = catalog_item(&f.spectacles, "Round Tortoise").await;
        let gone = Uuid::now_v7();

        let older = f
            .service
            .create_order(order_input(owner.id, &[frame.id]))
            .await
            .unwrap();
        let newer = f
            .service
            .create_order(order_input(owner.id, &[frame.id, gone]))
            .await
            .unwrap();

        let listed = f.service.list_user_orders(owner.id).await.unwrap();
        assert_eq!(
            listed.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert_eq!(listed[0].items[0].product_name.as_deref(), Some("Round Tortoise"));
        assert_eq!(listed[0].items[1].product_name, None);
    }

    #[tokio::test]
    async fn test_list_user_orders_empty_is_not_found() {
        let f = fixture();
        let result = f.service.list_user_orders(Uuid::now_v7()).await;
        assert!(matches!(result, Err(OrderError::NoOrdersForUser)));
    }

    #[tokio::test]
    async fn test_get_order_attaches_user() {
        let f = fixture();
        let owner = f.users.create(user()).await.unwrap();
        let order = f
            .service
            .create_order(order_input(owner.id, &[Uuid::now_v7()]))
            .await
            .unwrap();

        let found = f.service.get_order(order.id).await.unwrap();
        assert_eq!(found.order, order);
        assert_eq!(found.user.as_ref().map(|u| u.id), Some(owner.id));

        f.users.delete(owner.id).await.unwrap();
        let orphan = f.service.get_order(order.id).await.unwrap();
        assert!(orphan.user.is_none());

        assert!(matches!(
            f.service.get_order(Uuid::now_v7()).await,
            Err(OrderError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_cancel_order() {
        let f = fixture();
        let owner = f.users.create(user()).await.unwrap();
        let order = f
            .service
            .create_order(order_input(owner.id, &[Uuid::now_v7()]))
            .await
            .unwrap();

        let cancelled = f.service.cancel_order(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // Cancelling again is allowed
        let again = f.service.cancel_order(order.id).await.unwrap();
        assert_eq!(again.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_unknown_order_changes_nothing() {
        let mut orders = MockOrderRepository::new();
        orders.expect_set_status().times(1).returning(|_, _| Ok(None));
        orders.expect_create().never();
        orders.expect_delete().never();

        let service = OrderService::new(
            Arc::new(orders),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemorySpectacleRepository::new()),
        );

        assert!(matches!(
            service.cancel_order(Uuid::now_v7()).await,
            Err(OrderError::NotFound)
        ));
    }
}
