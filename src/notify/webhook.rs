use super::NotificationSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Posts each message as `{"text": …}` to an HTTP endpoint.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .gzip(true)
            .brotli(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn push(&self, message: &str) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&json!({ "text": message }))
            .send()
            .await
            .with_context(|| format!("Failed to post to {}", self.url))?
            .error_for_status()
            .with_context(|| format!("Webhook {} rejected the message", self.url))?;
        Ok(())
    }
}
