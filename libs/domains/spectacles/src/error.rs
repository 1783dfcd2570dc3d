use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum SpectacleError {
    #[error("Spectacle not found")]
    NotFound,

    #[error("Please provide all required fields")]
    MissingFields(Vec<&'static str>),

    #[error("Invalid price range")]
    InvalidPriceRange(String),

    #[error("Invalid {field}: {value}")]
    InvalidFilter { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),
}

pub type SpectacleResult<T> = Result<T, SpectacleError>;

impl From<SpectacleError> for AppError {
    fn from(err: SpectacleError) -> Self {
        match err {
            SpectacleError::NotFound => AppError::NotFound(err.to_string()),
            SpectacleError::MissingFields(ref missing) => AppError::BadRequestWithDetails {
                details: serde_json::json!({ "missing": missing }),
                message: err.to_string(),
            },
            SpectacleError::InvalidPriceRange(_) | SpectacleError::InvalidFilter { .. } => {
                AppError::BadRequest(err.to_string())
            }
            SpectacleError::Validation(errors) => AppError::ValidationError(errors),
            SpectacleError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SpectacleError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for SpectacleError {
    fn from(err: mongodb::error::Error) -> Self {
        SpectacleError::Database(err.to_string())
    }
}
