//! Outgoing email for the spectacles backend.
//!
//! - **Providers**: SMTP via lettre, a log-only fallback, and a mock for tests
//! - **Templates**: Handlebars-based `TemplateEngine`
//! - **Service**: `NotificationService` combining the two
//!
//! ```ignore
//! use email::NotificationService;
//!
//! let notifications = NotificationService::from_env()?;
//! notifications
//!     .send_password_reset("jane@example.com", "http://localhost:4000/reset-password/abc")
//!     .await?;
//! ```

pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod templates;

pub use error::{EmailError, EmailResult};
pub use models::Email;
pub use provider::{
    EmailProvider, LogProvider, MockEmailProvider, SendResult, SmtpConfig, SmtpProvider,
};
pub use service::{NotificationService, NotificationSetupError};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
