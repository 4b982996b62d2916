use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;
use tracing::{debug, warn};

use crate::utils::format_http_context;
use crate::{Error, Result};

/// Posts plain-text alerts to a Slack incoming webhook.
#[derive(Clone)]
pub struct SlackNotifier {
    client: Client,
    webhook: Option<Url>,
}

impl SlackNotifier {
    pub fn new(webhook: Option<Url>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::Client)?;
        Ok(Self { client, webhook })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook.is_some()
    }

    /// Sends `text`. Without a configured webhook this only logs a warning.
    pub async fn send(&self, text: &str) -> Result<()> {
        let Some(webhook) = &self.webhook else {
            warn!("No Slack webhook configured, skipping alert");
            return Ok(());
        };

        let response = self
            .client
            .post(webhook.clone())
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| Error::Webhook(format!("{}: {e}", format_http_context(e.status(), "POST", webhook))))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Webhook(format!(
                "{}: {body}",
                format_http_context(Some(status), "POST", webhook)
            )));
        }

        debug!(status = %status.as_u16(), "Slack alert delivered");
        Ok(())
    }
}
