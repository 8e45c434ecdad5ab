//! Discord webhook sink.

use serde_json::json;

use super::NotificationEvent;
use crate::config::{DISCORD_EMBED_COLOR, NOTIFY_TIMEOUT};
use crate::error_handling::NotifyError;

const FOOTER_TEXT: &str = "Tracker Monitor";

#[derive(Debug, Clone)]
pub struct DiscordSink {
    webhook_url: String,
}

impl DiscordSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
        }
    }

    fn payload(event: &NotificationEvent) -> serde_json::Value {
        json!({
            "embeds": [{
                "title": event.headline(),
                "description": event.body(),
                "url": event.action_url,
                "color": DISCORD_EMBED_COLOR,
                "timestamp": event.timestamp.to_rfc3339(),
                "footer": {"text": FOOTER_TEXT},
            }]
        })
    }

    pub async fn send(
        &self,
        client: &reqwest::Client,
        event: &NotificationEvent,
    ) -> Result<(), NotifyError> {
        client
            .post(&self.webhook_url)
            .json(&Self::payload(event))
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
