use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, TokenError};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email not found")]
    EmailNotFound,

    #[error("Invalid password. Please try again or reset your password.")]
    InvalidPassword,

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid user id: {0}")]
    InvalidId(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound | UserError::InvalidResetToken => AppError::NotFound(err.to_string()),
            UserError::DuplicateEmail | UserError::DuplicateUsername => {
                AppError::Conflict(err.to_string())
            }
            UserError::EmailNotFound | UserError::InvalidPassword | UserError::PasswordMismatch => {
                AppError::BadRequest(err.to_string())
            }
            UserError::Validation(errors) => AppError::ValidationError(errors),
            UserError::InvalidId(id) => AppError::InvalidUuid(format!("Invalid user id: {}", id)),
            UserError::BadRequest(msg) => AppError::BadRequest(msg),
            UserError::Unauthorized(msg) => AppError::Unauthorized(msg),
            UserError::Io(e) => AppError::Io(e),
            UserError::PasswordHash(_) | UserError::Token(_) | UserError::Database(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Duplicate key on insert; the unique index name tells which field collided
impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
            if write_error.code == 11000 {
                return if write_error.message.contains("username") {
                    UserError::DuplicateUsername
                } else {
                    UserError::DuplicateEmail
                };
            }
        }

        UserError::Database(err.to_string())
    }
}
