//! Provider used when no SMTP relay is configured.

use super::{EmailProvider, SendResult};
use crate::error::EmailResult;
use crate::models::Email;
use async_trait::async_trait;

/// Writes outgoing mail to the log instead of delivering it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProvider;

#[async_trait]
impl EmailProvider for LogProvider {
    async fn send(&self, email: &Email) -> EmailResult<SendResult> {
        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            body = email.body_text.as_deref().unwrap_or_default(),
            "SMTP not configured, email logged only"
        );

        Ok(SendResult {
            message_id: format!("log-{}", email.id),
        })
    }

    async fn health_check(&self) -> EmailResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
