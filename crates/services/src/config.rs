use std::env;

use els_core::session::QUESTION_TIME_BUDGET;
use url::Url;

use crate::error::ConfigError;

pub const RELAY_URL_VAR: &str = "ELS_RESULT_RELAY_URL";
pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "CHAT_ID";
pub const TELEGRAM_API_BASE_VAR: &str = "TELEGRAM_API_BASE";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Sizing of generated quizzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    pub question_seconds: u32,
    pub max_word_questions: usize,
    pub grammar_questions: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_seconds: QUESTION_TIME_BUDGET,
            max_word_questions: 10,
            grammar_questions: 5,
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn with_question_seconds(mut self, secs: u32) -> Self {
        self.question_seconds = secs;
        self
    }

    #[must_use]
    pub fn with_max_word_questions(mut self, count: usize) -> Self {
        self.max_word_questions = count;
        self
    }

    #[must_use]
    pub fn with_grammar_questions(mut self, count: usize) -> Self {
        self.grammar_questions = count;
        self
    }
}

//
// ─── REPORTERS ─────────────────────────────────────────────────────────────────
//

/// Endpoint of the intermediary that forwards results to the messaging channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub endpoint: Url,
}

impl RelayConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `endpoint` is not an http(s) URL.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_http_url(endpoint)?,
        })
    }

    /// Reads `ELS_RESULT_RELAY_URL`. Unset, blank or invalid values disable the relay.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let raw = non_blank_var(RELAY_URL_VAR)?;
        match Self::new(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(var = RELAY_URL_VAR, error = %err, "ignoring result relay configuration");
                None
            }
        }
    }
}

/// Bot credentials for posting results straight to Telegram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_base: Url,
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` for a blank token or chat id.
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self, ConfigError> {
        let bot_token = bot_token.trim();
        let chat_id = chat_id.trim();
        if bot_token.is_empty() {
            return Err(ConfigError::Missing(BOT_TOKEN_VAR));
        }
        if chat_id.is_empty() {
            return Err(ConfigError::Missing(CHAT_ID_VAR));
        }
        Ok(Self {
            api_base: parse_http_url(DEFAULT_TELEGRAM_API_BASE)?,
            bot_token: bot_token.to_owned(),
            chat_id: chat_id.to_owned(),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not an http(s) URL.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_http_url(api_base)?;
        Ok(self)
    }

    /// Reads `BOT_TOKEN`, `CHAT_ID` and optionally `TELEGRAM_API_BASE`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let token = non_blank_var(BOT_TOKEN_VAR)?;
        let chat_id = non_blank_var(CHAT_ID_VAR)?;
        let config = Self::new(&token, &chat_id).and_then(|config| {
            match non_blank_var(TELEGRAM_API_BASE_VAR) {
                Some(base) => config.with_api_base(&base),
                None => Ok(config),
            }
        });
        match config {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring telegram configuration");
                None
            }
        }
    }

    /// `<api_base>/bot<token>/sendMessage`
    #[must_use]
    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.as_str().trim_end_matches('/'),
            self.bot_token
        )
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_defaults() {
        let config = QuizConfig::default();
        assert_eq!(config.question_seconds, 30);
        assert_eq!(config.max_word_questions, 10);
        assert_eq!(config.grammar_questions, 5);

        let config = config.with_question_seconds(5).with_grammar_questions(2);
        assert_eq!(config.question_seconds, 5);
        assert_eq!(config.grammar_questions, 2);
    }

    #[test]
    fn relay_url_is_validated() {
        assert!(RelayConfig::new("https://els.example.com/api/send-result").is_ok());
        assert!(matches!(
            RelayConfig::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            RelayConfig::new("ftp://els.example.com/"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn telegram_requires_credentials() {
        assert!(matches!(
            TelegramConfig::new(" ", "42"),
            Err(ConfigError::Missing(BOT_TOKEN_VAR))
        ));
        assert!(matches!(
            TelegramConfig::new("123:abc", ""),
            Err(ConfigError::Missing(CHAT_ID_VAR))
        ));
    }

    #[test]
    fn telegram_send_message_url() {
        let config = TelegramConfig::new("123:abc", "42").unwrap();
        assert_eq!(
            config.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );

        let config = config.with_api_base("http://127.0.0.1:8081/").unwrap();
        assert_eq!(
            config.send_message_url(),
            "http://127.0.0.1:8081/bot123:abc/sendMessage"
        );
    }
}
