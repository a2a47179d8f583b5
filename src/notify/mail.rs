// src/notify/mail.rs
use super::{read_secret, NotificationSender, NotifyError};
use crate::config::MailConfig;
use crate::types::{Backend, Notification};
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

/// SMTP submission with STARTTLS before authentication.
pub struct MailSender {
    config: MailConfig,
    timeout: Duration,
}

impl MailSender {
    pub fn new(config: MailConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn compose(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let from: Mailbox = self.config.sender.parse()?;
        let to: Mailbox = self.config.recipient.parse()?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.config.subject.clone())
            .multipart(MultiPart::mixed().singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(notification.body()),
            ))?;
        Ok(message)
    }
}

impl NotificationSender for MailSender {
    fn backend(&self) -> Backend {
        Backend::Mail
    }

    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.compose(notification)?;
        // read at dispatch time, never cached
        let password = read_secret(&self.config.password_file)?;

        let transport = SmtpTransport::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(self.config.sender.clone(), password))
            .timeout(Some(self.timeout))
            .build();

        transport.send(&message)?;
        log::info!(
            "mail sent to {} via {}:{}",
            self.config.recipient,
            self.config.smtp_host,
            self.config.smtp_port
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn notification() -> Notification {
        Notification {
            bearing_label: "Первый подшипник".to_owned(),
            deadline: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        }
    }

    #[test]
    fn test_compose_sets_envelope() {
        let sender = MailSender::new(MailConfig::default(), Duration::from_secs(1));
        let message = sender.compose(&notification()).unwrap();
        let envelope = message.envelope();
        assert_eq!(
            envelope.from().map(|a| a.to_string()),
            Some("monitoring@example.com".to_owned())
        );
        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "maintenance@example.com");
    }

    #[test]
    fn test_compose_rejects_bad_address() {
        let config = MailConfig {
            recipient: "not an address".to_owned(),
            ..MailConfig::default()
        };
        let sender = MailSender::new(config, Duration::from_secs(1));
        assert!(matches!(
            sender.compose(&notification()),
            Err(NotifyError::Address(_))
        ));
    }

    #[test]
    fn test_missing_password_file_fails_before_network() {
        let config = MailConfig {
            password_file: "/definitely/not/here.txt".into(),
            ..MailConfig::default()
        };
        let sender = MailSender::new(config, Duration::from_secs(1));
        assert!(matches!(
            sender.send(&notification()),
            Err(NotifyError::Secret { .. })
        ));
    }
}
