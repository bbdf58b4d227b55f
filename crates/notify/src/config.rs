//! Credential loading from environment variables.
//!
//! When `MSGUTILS_PROFILE` is set (e.g. `PROD`), every key is first looked up
//! as `{PROFILE}_{KEY}`, falling back to `{KEY}`.

use std::env;

use crate::africas_talking::AfricasTalkingCredentials;
use crate::smtp::SmtpCredentials;
use crate::traits::NotifyError;
use crate::twilio::TwilioCredentials;

const PROFILE_KEY: &str = "MSGUTILS_PROFILE";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Active profile name, upper-cased (empty = default).
pub fn active_profile() -> String {
    env_opt(PROFILE_KEY).unwrap_or_default().to_uppercase()
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_required(profile: &str, key: &str) -> Result<String, NotifyError> {
    profiled_env_opt(profile, key).ok_or_else(|| {
        NotifyError::Config(format!("environment variable '{key}' is not set"))
    })
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

impl SmtpCredentials {
    /// Build from `SMTP_*` variables for the active profile.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::for_profile(&active_profile())
    }

    pub fn for_profile(profile: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            host: profiled_env_required(profile, "SMTP_HOST")?,
            port: profiled_env_opt(profile, "SMTP_PORT").unwrap_or_else(|| "587".to_string()),
            user: profiled_env_required(profile, "SMTP_USER")?,
            sender: profiled_env_required(profile, "SMTP_SENDER")?,
            password: profiled_env_required(profile, "SMTP_PASSWORD")?,
            use_tls: profiled_env_bool(profile, "SMTP_USE_TLS", true),
        })
    }
}

impl TwilioCredentials {
    /// Build from `TWILIO_*` variables for the active profile.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::for_profile(&active_profile())
    }

    pub fn for_profile(profile: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            account_sid: profiled_env_required(profile, "TWILIO_ACCOUNT_SID")?,
            auth_token: profiled_env_required(profile, "TWILIO_AUTH_TOKEN")?,
            sender_phone_number: profiled_env_required(profile, "TWILIO_PHONE_NUMBER")?,
            sender_name: profiled_env_opt(profile, "TWILIO_SENDER_NAME").unwrap_or_default(),
        })
    }
}

impl AfricasTalkingCredentials {
    /// Build from `AT_*` variables for the active profile.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::for_profile(&active_profile())
    }

    pub fn for_profile(profile: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            api_key: profiled_env_required(profile, "AT_API_KEY")?,
            username: profiled_env_required(profile, "AT_USERNAME")?,
            sender_id: profiled_env_opt(profile, "AT_SENDER_ID").unwrap_or_default(),
        })
    }
}
