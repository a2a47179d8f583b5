// src/notify/telegram.rs
use super::{read_secret, NotificationSender, NotifyError};
use crate::config::TelegramConfig;
use crate::types::{Backend, Notification};
use serde::Deserialize;
use std::time::Duration;

/// Destination used when no inbound message exists to take a chat id from.
///
/// Almost certainly not a real chat; the send is still attempted and the API
/// error (if any) is reported like any other failure.
pub const FALLBACK_CHAT_ID: i64 = 0;

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Chat id of the most recent update carrying a message, or [`FALLBACK_CHAT_ID`].
pub fn destination_from_updates(updates: &[Update]) -> i64 {
    match updates.iter().rev().find_map(|u| u.message.as_ref()) {
        Some(msg) => msg.chat.id,
        None => {
            log::warn!(
                "bot: no inbound message to reply to, falling back to chat id {}",
                FALLBACK_CHAT_ID
            );
            FALLBACK_CHAT_ID
        }
    }
}

/// Posts the notification text through the bot API.
pub struct TelegramSender {
    config: TelegramConfig,
    timeout: Duration,
}

impl TelegramSender {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            token,
            method
        )
    }

    fn check<T>(response: ApiResponse<T>) -> Result<Option<T>, NotifyError> {
        if response.ok {
            Ok(response.result)
        } else {
            Err(NotifyError::Api(
                response
                    .description
                    .unwrap_or_else(|| "no description".to_owned()),
            ))
        }
    }
}

impl NotificationSender for TelegramSender {
    fn backend(&self) -> Backend {
        Backend::Telegram
    }

    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let token = read_secret(&self.config.token_file)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let updates: ApiResponse<Vec<Update>> = client
            .get(self.method_url(&token, "getUpdates"))
            .send()?
            .json()?;
        let updates = Self::check(updates)?.unwrap_or_default();
        let chat_id = destination_from_updates(&updates);

        let sent: ApiResponse<serde_json::Value> = client
            .post(self.method_url(&token, "sendMessage"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": notification.body(),
            }))
            .send()?
            .json()?;
        Self::check(sent)?;
        log::info!("bot message sent to chat {chat_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<Update> {
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        TelegramSender::check(resp).unwrap().unwrap_or_default()
    }

    #[test]
    fn test_latest_message_chat_is_chosen() {
        let updates = parse(
            r#"{"ok":true,"result":[
                {"update_id":1,"message":{"message_id":10,"chat":{"id":111,"type":"private"},"text":"hi"}},
                {"update_id":2,"message":{"message_id":11,"chat":{"id":222,"type":"private"},"text":"yo"}},
                {"update_id":3,"my_chat_member":{}}
            ]}"#,
        );
        assert_eq!(destination_from_updates(&updates), 222);
    }

    #[test]
    fn test_no_updates_falls_back_to_sentinel() {
        // The send still goes out, addressed to chat 0, which is very likely invalid.
        let updates = parse(r#"{"ok":true,"result":[]}"#);
        assert_eq!(destination_from_updates(&updates), FALLBACK_CHAT_ID);
        assert_eq!(FALLBACK_CHAT_ID, 0);
    }

    #[test]
    fn test_api_error_is_surfaced() {
        let resp: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
                .unwrap();
        match TelegramSender::check(resp) {
            Err(NotifyError::Api(msg)) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_hides_token() {
        let token_file = std::env::temp_dir().join(format!(
            "bearing_monitor_{}_bot_token",
            std::process::id()
        ));
        std::fs::write(&token_file, "123456:SECRET_TOKEN\n").unwrap();
        let sender = TelegramSender::new(
            TelegramConfig {
                api_base: "http://127.0.0.1:9".to_owned(),
                token_file: token_file.clone(),
            },
            Duration::from_secs(2),
        );
        let notification = Notification {
            bearing_label: "Первый подшипник".to_owned(),
            deadline: chrono::NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        };
        let err = sender.send(&notification).unwrap_err();
        std::fs::remove_file(token_file).ok();
        assert!(matches!(err, NotifyError::Http(_)));
        let text = err.to_string();
        assert!(!text.contains("SECRET_TOKEN"), "{text}");
        assert!(!text.contains("123456"), "{text}");
    }

    #[test]
    fn test_method_url() {
        let sender = TelegramSender::new(
            TelegramConfig {
                api_base: "https://api.telegram.org/".to_owned(),
                ..TelegramConfig::default()
            },
            Duration::from_secs(1),
        );
        assert_eq!(
            sender.method_url("123:abc", "getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }
}
