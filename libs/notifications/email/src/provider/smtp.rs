//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::error::{EmailError, EmailResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{env_flag, env_or_default, env_parse_or, env_required, ConfigError, FromEnv};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// SMTP relay configuration
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("use_tls", &self.use_tls)
            .finish()
    }
}

impl SmtpConfig {
    /// `Ok(None)` when `SMTP_HOST` is unset, meaning mail should only be logged
    pub fn from_env_if_configured() -> Result<Option<Self>, ConfigError> {
        if std::env::var("SMTP_HOST").is_err() {
            return Ok(None);
        }
        Self::from_env().map(Some)
    }
}

/// - `SMTP_HOST` (required)
/// - `SMTP_PORT` (default: 587)
/// - `SMTP_USERNAME` / `SMTP_PASSWORD` (optional)
/// - `SMTP_FROM_EMAIL` (default: noreply@localhost)
/// - `SMTP_FROM_NAME` (default: Spectacles)
/// - `SMTP_USE_TLS` (default: false)
impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("SMTP_HOST")?,
            port: env_parse_or("SMTP_PORT", 587)?,
            username: std::env::var("SMTP_USERNAME").ok().filter(|v| !v.is_empty()),
            password: std::env::var("SMTP_PASSWORD").ok().filter(|v| !v.is_empty()),
            from_email: env_or_default("SMTP_FROM_EMAIL", "noreply@localhost"),
            from_name: env_or_default("SMTP_FROM_NAME", "Spectacles"),
            use_tls: env_flag("SMTP_USE_TLS"),
        })
    }
}

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpProvider {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> EmailResult<Self> {
        let from_raw = format!("{} <{}>", config.from_name, config.from_email);
        let from = from_raw
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress {
                address: from_raw.clone(),
                details: e.to_string(),
            })?;

        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| EmailError::Provider(format!("failed to create SMTP relay: {}", e)))?
        } else {
            // Plain connection, e.g. Mailpit/Mailhog in development
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(host = %config.host, port = config.port, tls = config.use_tls, "SMTP provider configured");

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &Email) -> EmailResult<Message> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress {
                address: email.to.clone(),
                details: e.to_string(),
            })?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject);

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            ),
            (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
            (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
            (None, None) => {
                return Err(EmailError::Build(
                    "email must have either a text or an HTML body".to_string(),
                ))
            }
        };

        message.map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> EmailResult<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::Provider(format!("SMTP send failed: {}", e)))?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(email_id = %email.id, subject = %email.subject, "Email sent via SMTP");

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> EmailResult<()> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EmailError::Provider("SMTP server refused NOOP".to_string())),
            Err(e) => Err(EmailError::Provider(format!("SMTP health check failed: {}", e))),
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
