//! Users Domain
//!
//! Accounts, bearer sessions, password reset and profiles, stored in MongoDB.
//!
//! ```text
//! handlers ─▶ service ─▶ repository (trait) ─▶ mongodb / in-memory
//!                │
//!                ├─▶ credentials (argon2, reset tokens)
//!                └─▶ email::NotificationService
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{handlers, MongoUserRepository, UserService, UsersConfig};
//!
//! let repository = Arc::new(MongoUserRepository::new(&db));
//! repository.init_indexes().await?;
//!
//! let service = UserService::new(repository, jwt_auth, notifications, UsersConfig::from_env()?);
//! let router = handlers::router(Arc::new(service));
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use config::UsersConfig;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    LoginRequest, ProfileResponse, ResetPasswordRequest, SignupRequest, User, UserResponse,
};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
