//! MongoDB connection management for the workspace.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::{common::RetryConfig, mongodb};
//!
//! let config = mongodb::MongoConfig::from_env()?;
//! let client = mongodb::connect_with_retry(&config, RetryConfig::default()).await?;
//! let db = client.database(&config.database);
//! ```

pub mod common;
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
