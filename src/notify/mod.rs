// src/notify/mod.rs
//! Notification dispatch: one `NotificationSender` interface, mail and chat-bot backends.
//!
//! Both backends are synchronous and fire-and-forget: a call that returns `Ok`
//! is the only delivery confirmation, and nothing is retried.
mod mail;
mod telegram;

pub use mail::MailSender;
pub use telegram::TelegramSender;

use crate::config::NotifyConfig;
use crate::types::{Backend, Notification};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Deadline format used in the message body (`16.10.2026`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("cannot read secret from {path}: {source}")]
    Secret {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("secret file {0} is empty")]
    EmptySecret(PathBuf),
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build mail: {0}")]
    Compose(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("bot API rejected the request: {0}")]
    Api(String),
}

// Bot API URLs carry the token, so it never goes into the error text.
impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Http(e.without_url())
    }
}

pub trait NotificationSender: Send {
    fn backend(&self) -> Backend;
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl Notification {
    pub fn body(&self) -> String {
        format!(
            "{} необходимо заменить до {}",
            self.bearing_label,
            self.deadline.format(DATE_FORMAT)
        )
    }
}

/// Reads the first line of a secret file, without the line terminator.
pub(crate) fn read_secret(path: &Path) -> Result<String, NotifyError> {
    let raw = fs::read_to_string(path).map_err(|source| NotifyError::Secret {
        path: path.to_path_buf(),
        source,
    })?;
    let first = raw.lines().next().unwrap_or_default().trim_end_matches('\r');
    if first.is_empty() {
        return Err(NotifyError::EmptySecret(path.to_path_buf()));
    }
    Ok(first.to_owned())
}

pub fn build_sender(config: &NotifyConfig) -> Box<dyn NotificationSender> {
    match config.backend {
        Backend::Mail => Box::new(MailSender::new(config.mail.clone(), config.timeout())),
        Backend::Telegram => Box::new(TelegramSender::new(
            config.telegram.clone(),
            config.timeout(),
        )),
    }
}
