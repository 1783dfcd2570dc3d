//! MongoDB connector, health probe and id encoding

mod config;
mod connector;
mod health;
pub mod ids;

pub use config::{DEFAULT_DATABASE, MongoConfig};
pub use connector::{connect, connect_with_retry};
pub use health::check_health;
pub use ids::{uuid_bson, uuids_bson};

pub use mongodb::{Client, Collection, Database};
