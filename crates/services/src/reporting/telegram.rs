use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::TelegramConfig;
use crate::error::ReportError;

use super::{ResultReporter, ResultSummary};

const MESSAGE_TITLE: &str = "ELS Test Result";

/// Sends summaries through the Telegram Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramReporter {
    client: Client,
    config: TelegramConfig,
}

impl TelegramReporter {
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }
}

#[async_trait]
impl ResultReporter for TelegramReporter {
    async fn report(&self, summary: &ResultSummary) -> Result<(), ReportError> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: format!("{MESSAGE_TITLE}\n\n{}", summary.message),
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        match response.json::<SendMessageResponse>().await {
            Ok(body) if body.ok => Ok(()),
            Ok(body) => Err(ReportError::Rejected(
                body.description
                    .unwrap_or_else(|| format!("telegram answered {status}")),
            )),
            Err(_) if !status.is_success() => Err(ReportError::HttpStatus(status)),
            Err(err) => Err(ReportError::Http(err)),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let payload = SendMessage {
            chat_id: "42",
            text: format!("{MESSAGE_TITLE}\n\nhello"),
            parse_mode: "Markdown",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["text"], "ELS Test Result\n\nhello");
        assert_eq!(json["parse_mode"], "Markdown");
    }

    #[test]
    fn rejection_carries_description() {
        let body: SendMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
                .unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
