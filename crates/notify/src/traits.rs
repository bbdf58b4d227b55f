//! Sender trait definition and shared error types.

/// Errors that can occur while dispatching a message.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Failed to read attachment: {0}")]
    Io(#[from] std::io::Error),

    #[error("{provider} API failed with status {status}. Response body: {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider acknowledged the request but its response could not be
    /// read, so delivery is unconfirmed rather than known to have failed.
    #[error("{provider} accepted the request, but the response could not be parsed: {reason}")]
    Ambiguous {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} send likely failed. Check API key/username. Response: {response}")]
    NotDelivered {
        provider: &'static str,
        response: String,
    },
}

impl NotifyError {
    /// True when the message may have been delivered but that could not be
    /// confirmed.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, NotifyError::Ambiguous { .. })
    }
}

/// Common shape of the SMS channels: one message to one recipient.
#[async_trait::async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `message` to `receiver`. A `None` message is rejected before
    /// any request is made.
    async fn send(&self, message: Option<&str>, receiver: &str) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "twilio").
    fn channel_name(&self) -> &str;
}

/// Reject a missing or blank message body.
pub(crate) fn require_message(message: Option<&str>) -> Result<&str, NotifyError> {
    match message {
        Some(body) => Ok(body),
        None => Err(NotifyError::Validation(
            "message body cannot be empty".to_string(),
        )),
    }
}

/// Reject an empty recipient.
pub(crate) fn require_receiver(receiver: &str) -> Result<&str, NotifyError> {
    if receiver.trim().is_empty() {
        return Err(NotifyError::Validation(
            "receiver cannot be empty".to_string(),
        ));
    }
    Ok(receiver)
}
