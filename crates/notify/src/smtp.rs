//! SMTP email sender via `lettre`.
//!
//! Builds one message (optional subject, optional plain/HTML body, binary
//! attachments) and submits it over an authenticated SMTP connection.
//! The `use_tls` credential flag selects implicit TLS (port 465), required
//! STARTTLS (any other port) or a plaintext connection.

use std::io::Read;

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};

use crate::traits::NotifyError;

/// Content type applied to every attachment, whatever its payload.
const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// Port on which the server expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Connection and authentication settings for one SMTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpCredentials {
    pub host: String,
    /// Kept as text; parsed when a send is attempted.
    pub port: String,
    pub user: String,
    /// Address placed in the `From` header.
    pub sender: String,
    pub password: String,
    #[serde(default)]
    pub use_tls: bool,
}

/// A byte stream to attach to an outgoing email.
///
/// The stream is consumed exactly once while the message is built.
pub struct EmailAttachment {
    pub data: Box<dyn Read + Send>,
    pub name: Option<String>,
}

impl EmailAttachment {
    pub fn new(data: impl Read + Send + 'static, name: impl Into<String>) -> Self {
        Self {
            data: Box::new(data),
            name: Some(name.into()),
        }
    }
}

impl std::fmt::Debug for EmailAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailAttachment")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Sends email through the SMTP server described by its credentials.
#[derive(Debug, Clone)]
pub struct SmtpSender {
    credentials: SmtpCredentials,
}

impl SmtpSender {
    pub fn new(credentials: SmtpCredentials) -> Self {
        Self { credentials }
    }

    /// Parse the string-encoded port.
    ///
    /// Returns [`NotifyError::Config`] naming the value when it is not a
    /// valid port number.
    pub fn port(&self) -> Result<u16, NotifyError> {
        self.credentials.port.trim().parse::<u16>().map_err(|e| {
            NotifyError::Config(format!(
                "invalid port number '{}': {e}",
                self.credentials.port
            ))
        })
    }

    /// Build the outgoing message without sending it.
    ///
    /// Attachments are read to completion here and dropped afterwards.
    pub fn build_message(
        &self,
        subject: Option<&str>,
        message: Option<&str>,
        is_html: bool,
        attachments: Vec<EmailAttachment>,
        receivers: &[String],
    ) -> Result<Message, NotifyError> {
        if receivers.is_empty() {
            return Err(NotifyError::Validation(
                "at least one receiver is required".to_string(),
            ));
        }

        let mut builder = Message::builder().from(parse_mailbox(&self.credentials.sender)?);
        for receiver in receivers {
            builder = builder.to(parse_mailbox(receiver)?);
        }
        if let Some(subject) = subject {
            builder = builder.subject(subject);
        }

        let text_part = message.map(|body| {
            if is_html {
                SinglePart::html(body.to_string())
            } else {
                SinglePart::plain(body.to_string())
            }
        });

        let email = if attachments.is_empty() {
            match text_part {
                Some(part) => builder.singlepart(part),
                None => builder.header(ContentType::TEXT_PLAIN).body(String::new()),
            }
        } else {
            let mut parts = Vec::with_capacity(attachments.len() + 1);
            parts.extend(text_part);
            for attachment in attachments {
                parts.push(attachment_part(attachment)?);
            }

            let multipart = parts
                .into_iter()
                .fold(None, |mixed: Option<MultiPart>, part| {
                    Some(match mixed {
                        Some(mixed) => mixed.singlepart(part),
                        None => MultiPart::mixed().singlepart(part),
                    })
                })
                .ok_or_else(|| NotifyError::Config("multipart message without parts".to_string()))?;
            builder.multipart(multipart)
        };

        email.map_err(|e| NotifyError::Config(format!("failed to build email: {e}")))
    }

    fn transport(&self, port: u16) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let host = self.credentials.host.as_str();
        let builder = if !self.credentials.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        } else if port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        Ok(builder
            .port(port)
            .credentials(Credentials::new(
                self.credentials.user.clone(),
                self.credentials.password.clone(),
            ))
            .build())
    }

    /// Build and submit one email in a single SMTP transaction.
    pub async fn send(
        &self,
        subject: Option<&str>,
        message: Option<&str>,
        is_html: bool,
        attachments: Vec<EmailAttachment>,
        receivers: &[String],
    ) -> Result<(), NotifyError> {
        let port = self.port()?;
        let email = self.build_message(subject, message, is_html, attachments, receivers)?;
        let transport = self.transport(port)?;

        tracing::debug!(
            host = %self.credentials.host,
            port,
            tls = self.credentials.use_tls,
            recipients = receivers.len(),
            "sending email"
        );

        transport.send(email).await?;

        tracing::info!(
            channel = "smtp",
            recipients = receivers.len(),
            "email delivered"
        );

        Ok(())
    }
}

/// Send one email with the given credentials.
pub async fn send_smtp_email(
    credentials: &SmtpCredentials,
    subject: Option<&str>,
    message: Option<&str>,
    is_html: bool,
    attachments: Vec<EmailAttachment>,
    receivers: &[String],
) -> Result<(), NotifyError> {
    SmtpSender::new(credentials.clone())
        .send(subject, message, is_html, attachments, receivers)
        .await
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| {
            NotifyError::Config(format!("invalid email address '{address}': {e}"))
        })
}

fn attachment_part(mut attachment: EmailAttachment) -> Result<SinglePart, NotifyError> {
    let name = attachment.name.take().ok_or_else(|| {
        NotifyError::Validation("attachment name is required".to_string())
    })?;

    let mut content = Vec::new();
    attachment.data.read_to_end(&mut content)?;

    let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
        .map_err(|e| NotifyError::Config(e.to_string()))?;

    Ok(Attachment::new(name).body(content, content_type))
}
