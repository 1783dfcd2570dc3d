//! Mock email provider for testing

use super::{EmailProvider, SendResult};
use crate::error::{EmailError, EmailResult};
use crate::models::Email;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Captures sent emails instead of delivering them
#[derive(Clone, Default)]
pub struct MockEmailProvider {
    sent_emails: Arc<Mutex<Vec<Email>>>,
    failure_message: Option<String>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent_emails: Arc::default(),
            failure_message: Some(message.into()),
        }
    }

    pub async fn sent_emails(&self) -> Vec<Email> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == address)
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &Email) -> EmailResult<SendResult> {
        if let Some(message) = &self.failure_message {
            return Err(EmailError::Provider(message.clone()));
        }

        self.sent_emails.lock().await.push(email.clone());

        Ok(SendResult {
            message_id: format!("mock-{}", email.id),
        })
    }

    async fn health_check(&self) -> EmailResult<()> {
        match &self.failure_message {
            Some(message) => Err(EmailError::Provider(message.clone())),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
