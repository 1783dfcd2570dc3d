//! Spectacles Domain
//!
//! Catalog of frames and lenses with gender, category and price-range filtering.
//!
//! ```rust,ignore
//! use domain_spectacles::{handlers, MongoSpectacleRepository, SpectacleService};
//!
//! let repository = Arc::new(MongoSpectacleRepository::new(&db));
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(Arc::new(SpectacleService::new(repository)));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{SpectacleError, SpectacleResult};
pub use handlers::ApiDoc;
pub use models::{
    Category, CreateSpectacle, Gender, PriceRange, Spectacle, SpectacleFilter, SpectacleQuery,
    UpdateSpectacle,
};
pub use mongodb::MongoSpectacleRepository;
pub use repository::{InMemorySpectacleRepository, SpectacleRepository};
pub use service::SpectacleService;
