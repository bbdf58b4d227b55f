//! Message dispatch over SMTP email, Twilio SMS and Africa's Talking SMS.
//!
//! This crate provides:
//! - `SmtpSender` for email with optional attachments
//! - `TwilioSender` and `AfricasTalkingSender` behind the `SmsSender` trait
//! - one-shot `send_*` functions taking credentials per call
//! - environment-based credential loading

pub mod africas_talking;
pub mod config;
pub mod smtp;
pub mod traits;
pub mod twilio;

pub use africas_talking::{send_africas_talking_sms, AfricasTalkingCredentials, AfricasTalkingSender};
pub use smtp::{send_smtp_email, EmailAttachment, SmtpCredentials, SmtpSender};
pub use traits::{NotifyError, SmsSender};
pub use twilio::{send_twilio_sms, TwilioCredentials, TwilioSender};
