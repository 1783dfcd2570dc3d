//! Error types for outgoing mail.

use thiserror::Error;

pub type EmailResult<T> = Result<T, EmailError>;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid address '{address}': {details}")]
    InvalidAddress { address: String, details: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Template error: {0}")]
    Template(String),

    /// Relay, network or authentication failure (SMTP, etc.)
    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<handlebars::RenderError> for EmailError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for EmailError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}
