//! Telegram Bot API sink.

use serde_json::json;

use super::{EventKind, NotificationEvent};
use crate::config::NOTIFY_TIMEOUT;
use crate::error_handling::NotifyError;

#[derive(Debug, Clone)]
pub struct TelegramSink {
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }

    /// Message in Telegram's legacy Markdown.
    fn text(event: &NotificationEvent) -> String {
        let link_label = match event.kind {
            EventKind::Opened => "Open Signup Page",
            EventKind::InvitesFound(_) | EventKind::Test => "Tracker Page",
        };
        format!(
            "*{}*\n\n{}\n\n[{}]({})",
            escape_markdown(&event.headline()),
            escape_markdown(&event.body()),
            link_label,
            event.action_url
        )
    }

    pub async fn send(
        &self,
        client: &reqwest::Client,
        event: &NotificationEvent,
    ) -> Result<(), NotifyError> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": Self::text(event),
            "parse_mode": "Markdown",
            "disable_web_page_preview": false,
        });
        client
            .post(self.endpoint())
            .json(&payload)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Escapes the characters legacy Markdown treats as markup.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
