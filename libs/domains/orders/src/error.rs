use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_spectacles::SpectacleError;
use domain_users::UserError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("No orders found for this user")]
    NoOrdersForUser,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Catalog(#[from] SpectacleError),

    #[error("Database error: {0}")]
    Database(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound | OrderError::UserNotFound | OrderError::NoOrdersForUser => {
                AppError::NotFound(err.to_string())
            }
            OrderError::Validation(errors) => AppError::ValidationError(errors),
            OrderError::User(e) => e.into(),
            OrderError::Catalog(e) => e.into(),
            OrderError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for OrderError {
    fn from(err: mongodb::error::Error) -> Self {
        OrderError::Database(err.to_string())
    }
}
