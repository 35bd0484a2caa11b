use crate::domain::events::WorkflowEvent;
use crate::domain::ports::NotificationSink;
use crate::utils::error::{MarketError, Result};
use async_trait::async_trait;
use url::Url;

/// Posts every workflow event to a chat webhook as a fenced audit line.
/// Delivery failures are logged and swallowed; the workflow itself never
/// blocks on the audit channel.
pub struct WebhookSink {
    client: reqwest::Client,
    url: Url,
}

impl WebhookSink {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|err| MarketError::Config {
            message: format!("invalid webhook URL: {err}"),
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            url,
        })
    }

    async fn post(&self, event: &WorkflowEvent) -> std::result::Result<(), reqwest::Error> {
        let payload = serde_json::json!({
            "content": format!("```{}```", event.audit_line()),
        });
        self.client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn notify(&self, event: &WorkflowEvent) {
        if let Err(err) = self.post(event).await {
            tracing::warn!(kind = ?event.kind(), error = %err, "webhook delivery failed");
        }
    }
}

/// Fallback sink for deployments without a webhook: audit lines go to the
/// structured log instead.
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, event: &WorkflowEvent) {
        tracing::info!(kind = ?event.kind(), "{}", event.audit_line());
    }
}
