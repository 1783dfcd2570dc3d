//! High-level sending API used by the domain services.

use crate::error::EmailResult;
use crate::models::Email;
use crate::provider::{EmailProvider, LogProvider, SendResult, SmtpConfig, SmtpProvider};
use crate::templates::{PasswordResetData, TemplateEngine, PASSWORD_RESET};
use core_config::ConfigError;
use std::sync::Arc;
use tracing::{info, instrument};

/// Failure to assemble the service at startup
#[derive(Debug, thiserror::Error)]
pub enum NotificationSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Email(#[from] crate::error::EmailError),
}

/// Renders templates and hands the result to the configured provider.
#[derive(Clone)]
pub struct NotificationService {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
}

impl NotificationService {
    pub fn new(provider: Arc<dyn EmailProvider>, templates: TemplateEngine) -> Self {
        Self {
            provider,
            templates: Arc::new(templates),
        }
    }

    /// SMTP when `SMTP_HOST` is set, otherwise mail is only logged.
    pub fn from_env() -> Result<Self, NotificationSetupError> {
        let provider: Arc<dyn EmailProvider> = match SmtpConfig::from_env_if_configured()? {
            Some(config) => Arc::new(SmtpProvider::new(&config)?),
            None => Arc::new(LogProvider),
        };
        info!(provider = provider.name(), "Email provider selected");

        Ok(Self::new(provider, TemplateEngine::new()?))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    #[instrument(skip(self, reset_url))]
    pub async fn send_password_reset(&self, to: &str, reset_url: &str) -> EmailResult<SendResult> {
        let rendered = self
            .templates
            .render(PASSWORD_RESET, &PasswordResetData { reset_url })?;

        let mut email = Email::new(to, rendered.subject);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;

        self.provider.send(&email).await
    }

    pub async fn health_check(&self) -> EmailResult<()> {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockEmailProvider;

    #[tokio::test]
    async fn test_send_password_reset() {
        let mock = MockEmailProvider::new();
        let service = NotificationService::new(Arc::new(mock.clone()), TemplateEngine::new().unwrap());

        service
            .send_password_reset("jane@example.com", "http://localhost:4000/reset-password/ff00")
            .await
            .unwrap();

        let sent = mock.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert_eq!(sent[0].subject, "Password Reset");
        assert!(sent[0]
            .body_text
            .as_deref()
            .unwrap()
            .ends_with("http://localhost:4000/reset-password/ff00"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_returned() {
        let service = NotificationService::new(
            Arc::new(MockEmailProvider::failing("boom")),
            TemplateEngine::new().unwrap(),
        );

        assert!(service.send_password_reset("a@example.com", "http://x/1").await.is_err());
    }

    #[test]
    fn test_from_env_falls_back_to_log_provider() {
        temp_env::with_var_unset("SMTP_HOST", || {
            let service = NotificationService::from_env().unwrap();
            assert_eq!(service.provider_name(), "log");
        });
    }
}
