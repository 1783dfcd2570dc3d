//! Orders Domain
//!
//! Checkout, per-user history and cancellation. Orders reference their owner
//! by id and are also listed on the owner's `orders` array; catalog names are
//! joined in when a user's orders are listed.
//!
//! ```rust,ignore
//! use domain_orders::{handlers, MongoOrderRepository, OrderService};
//!
//! let orders = Arc::new(MongoOrderRepository::new(&db));
//! orders.init_indexes().await?;
//!
//! let service = OrderService::new(orders, user_repository, spectacle_repository);
//! let router = handlers::router(Arc::new(service));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use models::{CreateOrder, Order, OrderItem, OrderStatus, OrderWithUser, UserOrder};
pub use mongodb::MongoOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
