//! Twilio SMS sender.
//!
//! Submits one message-create request to the Twilio REST API
//! (`/2010-04-01/Accounts/{sid}/Messages.json`) with HTTP Basic auth.

use serde::{Deserialize, Serialize};

use crate::traits::{require_message, require_receiver, NotifyError, SmsSender};

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

const PROVIDER: &str = "Twilio";

/// Account credentials and sender identity for Twilio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub sender_phone_number: String,
    /// Display name. Not used when sending.
    #[serde(default)]
    pub sender_name: String,
}

/// Sends SMS messages through the Twilio messaging API.
#[derive(Debug)]
pub struct TwilioSender {
    credentials: TwilioCredentials,
    base_url: String,
    client: reqwest::Client,
}

impl TwilioSender {
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the sender at a different API host (no trailing slash).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.credentials.account_sid
        )
    }
}

#[async_trait::async_trait]
impl SmsSender for TwilioSender {
    async fn send(&self, message: Option<&str>, receiver: &str) -> Result<(), NotifyError> {
        let body = require_message(message)?;
        let receiver = require_receiver(receiver)?;

        let form = [
            ("Body", body),
            ("From", self.credentials.sender_phone_number.as_str()),
            ("To", receiver),
        ];

        tracing::debug!(
            account_sid = %self.credentials.account_sid,
            from = %self.credentials.sender_phone_number,
            "sending Twilio SMS"
        );

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Twilio rejected message");
            return Err(NotifyError::Rejected {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(channel = "twilio", %status, "SMS submitted");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "twilio"
    }
}

/// Send one SMS through Twilio.
pub async fn send_twilio_sms(
    credentials: &TwilioCredentials,
    message: Option<&str>,
    receiver: &str,
) -> Result<(), NotifyError> {
    TwilioSender::new(credentials.clone())
        .send(message, receiver)
        .await
}
