//! Generic JSON webhook sink.
//!
//! Payload:
//! `{"tracker_name", "tracker_url", "message", "timestamp", "status"}`, plus
//! `"items"` for invite events.

use serde::Serialize;

use super::NotificationEvent;
use crate::config::NOTIFY_TIMEOUT;
use crate::error_handling::NotifyError;
use crate::scan::ScanItem;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    tracker_name: &'a str,
    tracker_url: &'a str,
    message: &'a str,
    timestamp: String,
    status: &'static str,
    #[serde(skip_serializing_if = "no_items")]
    items: &'a [ScanItem],
}

fn no_items(items: &&[ScanItem]) -> bool {
    items.is_empty()
}

impl<'a> From<&'a NotificationEvent> for WebhookPayload<'a> {
    fn from(event: &'a NotificationEvent) -> Self {
        Self {
            tracker_name: &event.target,
            tracker_url: &event.action_url,
            message: &event.message,
            timestamp: event.timestamp.to_rfc3339(),
            status: event.kind.status(),
            items: event.items(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookSink {
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub async fn send(
        &self,
        client: &reqwest::Client,
        event: &NotificationEvent,
    ) -> Result<(), NotifyError> {
        client
            .post(&self.url)
            .json(&WebhookPayload::from(event))
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
