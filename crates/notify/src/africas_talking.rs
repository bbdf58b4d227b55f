//! Africa's Talking SMS sender.
//!
//! The messaging endpoint answers 200/201 even when nothing was sent, so the
//! outcome is decided from the response body as well as the status code:
//!
//! - any other status is a rejection carrying the status and raw body;
//! - an unparseable body is an ambiguous outcome;
//! - a zero-cost status line is a disguised failure (see
//!   [`is_disguised_failure`]).

use serde::{Deserialize, Serialize};

use crate::traits::{require_message, require_receiver, NotifyError, SmsSender};

const DEFAULT_BASE_URL: &str = "https://api.africastalking.com";

/// Sandbox host for test accounts.
pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.africastalking.com";

const MESSAGING_PATH: &str = "/version1/messaging";

const PROVIDER: &str = "Africa's Talking";

/// Status text the provider returns when it accepted a request but billed
/// nothing, typically because the API key or username is wrong. Matched
/// verbatim against observed provider wording.
pub const ZERO_COST_MARKER: &str = "Total Cost: KES 0.00";

/// Returns true when a successful-looking status text means nothing was sent.
pub fn is_disguised_failure(status_text: &str) -> bool {
    status_text.contains(ZERO_COST_MARKER)
}

/// API key, account username and sender ID for Africa's Talking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfricasTalkingCredentials {
    pub api_key: String,
    pub username: String,
    #[serde(default)]
    pub sender_id: String,
}

#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    username: &'a str,
    /// Comma-separated list of recipients.
    to: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    from: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsResponse {
    #[serde(rename = "SMSMessageData")]
    sms_message_data: SmsMessageData,
}

#[derive(Debug, Deserialize)]
struct SmsMessageData {
    #[serde(rename = "Message")]
    message: String,
}

/// Sends SMS messages through the Africa's Talking messaging API.
#[derive(Debug)]
pub struct AfricasTalkingSender {
    credentials: AfricasTalkingCredentials,
    base_url: String,
    client: reqwest::Client,
}

impl AfricasTalkingSender {
    pub fn new(credentials: AfricasTalkingCredentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the sender at a different API host, e.g. [`SANDBOX_BASE_URL`].
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messaging_url(&self) -> String {
        format!("{}{MESSAGING_PATH}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl SmsSender for AfricasTalkingSender {
    async fn send(&self, message: Option<&str>, receiver: &str) -> Result<(), NotifyError> {
        let message = require_message(message)?;
        let receiver = require_receiver(receiver)?;

        let payload = SmsRequest {
            username: &self.credentials.username,
            to: receiver,
            message,
            from: &self.credentials.sender_id,
        };

        tracing::debug!(
            username = %self.credentials.username,
            sender_id = %self.credentials.sender_id,
            "sending Africa's Talking SMS"
        );

        let response = self
            .client
            .post(self.messaging_url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .header("apiKey", &self.credentials.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Africa's Talking rejected message");
            return Err(NotifyError::Rejected {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| NotifyError::Ambiguous {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;
        let parsed: SmsResponse =
            serde_json::from_str(&body).map_err(|e| NotifyError::Ambiguous {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        let status_text = parsed.sms_message_data.message;
        if is_disguised_failure(&status_text) {
            tracing::warn!(response = %status_text, "Africa's Talking billed nothing");
            return Err(NotifyError::NotDelivered {
                provider: PROVIDER,
                response: status_text,
            });
        }

        tracing::info!(channel = "africas_talking", response = %status_text, "SMS sent");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "africas_talking"
    }
}

/// Send one SMS through Africa's Talking.
pub async fn send_africas_talking_sms(
    credentials: &AfricasTalkingCredentials,
    message: Option<&str>,
    receiver: &str,
) -> Result<(), NotifyError> {
    AfricasTalkingSender::new(credentials.clone())
        .send(message, receiver)
        .await
}
