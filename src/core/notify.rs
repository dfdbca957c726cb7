//! Telegram bot notifications.
//!
//! Sends a single Markdown message through the bot API's `sendMessage`
//! method. Delivery is best effort: the caller only learns whether the API
//! answered with a success status.

use crate::{
    errors::Result,
    models::{ChatId, TelegramConfig},
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
    parse_mode: &'a str,
}

/// HTTP client for the Telegram bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    api_base: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a notifier posting to `api_base` (e.g. `https://api.telegram.org`).
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn send_message_url(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }

    /// Posts `message` to the configured chat.
    ///
    /// Returns `Ok(false)` without any request when `config` lacks a token or
    /// chat id, `Ok(true)` on a 2xx answer and `Ok(false)` on any other status.
    ///
    /// # Errors
    /// Returns `Error::Notification` when the request cannot be sent.
    #[instrument(skip(self, config, message))]
    pub async fn send(&self, config: &TelegramConfig, message: &str) -> Result<bool> {
        let Some((token, chat_id)) = config.credentials() else {
            debug!("Telegram not configured");
            return Ok(false);
        };

        let body = SendMessageBody {
            chat_id,
            text: message,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.send_message_url(token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Telegram API answered with status {}", status);
        }
        Ok(status.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn configured() -> TelegramConfig {
        TelegramConfig {
            token: Some("123:abc".to_string()),
            chat_id: Some(ChatId::Text("-100200".to_string())),
        }
    }

    #[tokio::test]
    async fn test_send_posts_markdown_message() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(json!({
                "chat_id": "-100200",
                "text": "*New homework* submitted",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(server.uri());
        assert!(notifier.send(&configured(), "*New homework* submitted").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_non_success_status_is_false() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(format!("{}/", server.uri()));
        assert!(!notifier.send(&configured(), "hello").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_unconfigured_makes_no_request() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(server.uri());
        assert!(!notifier.send(&TelegramConfig::default(), "hello").await?);
        Ok(())
    }
}
