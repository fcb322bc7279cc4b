use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde_json::json;
use tracing::{info, warn};

use super::event::{StatusEvent, TransitionKind};

/// Destination for status events. Delivery is best-effort: failures are
/// reported to the caller, never retried.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, event: &StatusEvent) -> Result<()>;
}

fn webhook_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

async fn post_json(client: &reqwest::Client, url: &str, body: &serde_json::Value) -> Result<()> {
    let response = client.post(url).json(body).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Webhook responded with status {}", response.status()));
    }
    Ok(())
}

/// POSTs the raw event as JSON
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { client: webhook_client(timeout)?, url: url.into() })
    }
}

#[async_trait::async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, event: &StatusEvent) -> Result<()> {
        post_json(&self.client, &self.url, &serde_json::to_value(event)?).await
    }
}

/// POSTs a Discord embed
pub struct DiscordSink {
    client: reqwest::Client,
    url: String,
}

impl DiscordSink {
    const RED: u32 = 0xf04747;
    const GREEN: u32 = 0x43b581;

    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { client: webhook_client(timeout)?, url: url.into() })
    }

    pub fn embed(event: &StatusEvent) -> serde_json::Value {
        let (title, color) = match event.kind {
            TransitionKind::ServiceDown => ("Service Down", Self::RED),
            TransitionKind::ServiceUp => ("Service Restored", Self::GREEN),
        };

        let status = match event.status_code {
            Some(code) => format!("HTTP {}", code),
            None => "Connection Error".to_string(),
        };

        let mut fields = vec![json!({ "name": "Status", "value": status, "inline": true })];
        if let Some(error) = &event.error {
            fields.push(json!({ "name": "Error", "value": error, "inline": false }));
        }

        json!({
            "embeds": [{
                "title": title,
                "color": color,
                "description": format!("**Service:** {}", event.service),
                "fields": fields,
                "timestamp": event.timestamp,
            }]
        })
    }
}

#[async_trait::async_trait]
impl NotificationSink for DiscordSink {
    fn name(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, event: &StatusEvent) -> Result<()> {
        post_json(&self.client, &self.url, &Self::embed(event)).await
    }
}

/// Outcome of fanning one event out to every sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans events out to all configured sinks
#[derive(Default)]
pub struct NotificationDispatcher {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver to every sink, logging each failure
    pub async fn dispatch(&self, event: &StatusEvent) -> DeliveryReport {
        info!(service = %event.service, kind = %event.kind, "Sending notification");

        let mut report = DeliveryReport::default();
        for sink in &self.sinks {
            match sink.deliver(event).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(sink = sink.name(), service = %event.service, "Notification delivery failed: {:#}", e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}
