use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::domain::{DomainError, DomainResult, MailMessage, Mailer};

const SERVICE: &str = "mail";

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// STARTTLS relay when true, plaintext otherwise (local catchers like Mailtrap/MailHog).
    pub starttls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1025,
            user: String::new(),
            password: String::new(),
            starttls: false,
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> DomainResult<Self> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| DomainError::upstream(SERVICE, e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if !config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn parse_mailbox(address: &str) -> DomainResult<Mailbox> {
    address
        .parse()
        .map_err(|e| DomainError::Validation(format!("Invalid email address {}: {}", address, e)))
}

pub(crate) fn build_message(message: &MailMessage) -> DomainResult<Message> {
    Message::builder()
        .from(parse_mailbox(&message.from)?)
        .to(parse_mailbox(&message.to)?)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())
        .map_err(|e| DomainError::upstream(SERVICE, e))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, message: MailMessage) -> DomainResult<()> {
        let email = build_message(&message)?;

        match self.transport.send(email).await {
            Ok(_) => {
                info!(to = %message.to, subject = %message.subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                error!(to = %message.to, error = %e, "Failed to send email");
                Err(DomainError::upstream(SERVICE, e))
            }
        }
    }
}

/// Writes messages to the log instead of delivering them. Used when mail is disabled.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_mail(&self, message: MailMessage) -> DomainResult<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.html,
            "Mail delivery disabled, logging message"
        );
        Ok(())
    }
}
