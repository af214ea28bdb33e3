//! Email channel transport
//!
//! SMTP delivery for notification emails. The transport sits behind the
//! `EmailSender` trait so the fan-out logic can be exercised with a
//! recording sender in tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;

/// Outbound email transport.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message to every address in `to`.
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()>;
}

/// SMTP-backed email sender built from configuration.
pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        if self.config.smtp_host.is_empty() {
            return Err(anyhow!(
                "SMTP host not configured. Please configure SMTP settings first."
            ));
        }
        if to.is_empty() {
            return Err(anyhow!("No recipients given"));
        }

        // Build email
        let from = format!("{} <{}>", self.config.from_name, self.config.from_address);
        let mut builder = Message::builder()
            .from(from.parse().map_err(|e| anyhow!("Invalid from address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for address in to {
            builder = builder.to(address
                .parse()
                .map_err(|e| anyhow!("Invalid to address '{}': {}", address, e))?);
        }

        let email = builder
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        // Build SMTP transport
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(creds)
                .port(self.config.smtp_port)
                .build();

        // Send email
        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_host_errors() {
        let sender = SmtpEmailSender::new(EmailConfig::default());
        let result = sender
            .send(&["reader@example.com".to_string()], "Subject", "Body")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_recipient_list_errors() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            ..EmailConfig::default()
        };
        let sender = SmtpEmailSender::new(config);
        assert!(sender.send(&[], "Subject", "Body").await.is_err());
    }
}
