use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::RelayConfig;
use crate::error::ReportError;

use super::{ResultReporter, ResultSummary};

/// Posts summaries to the intermediary endpoint, which holds the messaging credentials.
#[derive(Clone)]
pub struct HttpRelayReporter {
    client: Client,
    config: RelayConfig,
}

impl HttpRelayReporter {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[async_trait]
impl ResultReporter for HttpRelayReporter {
    async fn report(&self, summary: &ResultSummary) -> Result<(), ReportError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(summary)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::HttpStatus(response.status()));
        }

        // Relays that answer without a JSON body are taken at their status code.
        match response.json::<RelayResponse>().await {
            Ok(body) if !body.success => Err(ReportError::Rejected(
                body.details
                    .or(body.error)
                    .unwrap_or_else(|| "relay reported failure".into()),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(default = "default_success")]
    success: bool,
    error: Option<String>,
    details: Option<String>,
}

fn default_success() -> bool {
    true
}
