//! Notification delivery.
//!
//! The monitor produces [`NotificationEvent`]s; a [`Notifier`] fans each one
//! out to every configured sink. Sinks fail independently and a failed
//! delivery never affects monitor state.

mod discord;
mod email;
mod telegram;
mod webhook;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use crate::config::{NotificationsConfig, MAX_ITEMS_PER_MESSAGE, MAX_MESSAGE_CHARS};
use crate::error_handling::{ConfigError, NotifyError};
use crate::models::Target;
use crate::scan::ScanItem;
use crate::utils::text::truncate_chars;

pub use discord::DiscordSink;
pub use email::EmailSink;
pub use telegram::TelegramSink;
pub use webhook::WebhookSink;

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Signups went from closed (or unknown) to open.
    Opened,
    /// Previously unseen invite mentions were found.
    InvitesFound(Vec<ScanItem>),
    /// Sent by `--check-config` to verify a channel.
    Test,
}

impl EventKind {
    /// Machine-readable status, as sent to generic webhooks.
    pub fn status(&self) -> &'static str {
        match self {
            EventKind::Opened => "open",
            EventKind::InvitesFound(_) => "invites_found",
            EventKind::Test => "test",
        }
    }
}

/// A single notification, independent of the sink format.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    /// Tracker name
    pub target: String,
    /// Link for the reader to follow
    pub action_url: String,
    /// Human-readable summary
    pub message: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn opened(target: &Target) -> Self {
        Self {
            target: target.name.clone(),
            action_url: target.signup_url.clone(),
            message: format!("Registration is now open at {}!", target.name),
            kind: EventKind::Opened,
            timestamp: Utc::now(),
        }
    }

    pub fn invites_found(target: &Target, items: Vec<ScanItem>) -> Self {
        let noun = if items.len() == 1 { "mention" } else { "mentions" };
        Self {
            target: target.name.clone(),
            action_url: target.signup_url.clone(),
            message: format!(
                "Found {} new invite {} for {}",
                items.len(),
                noun,
                target.name
            ),
            kind: EventKind::InvitesFound(items),
            timestamp: Utc::now(),
        }
    }

    pub fn test() -> Self {
        Self {
            target: "TestTracker".to_string(),
            action_url: "https://example.com/".to_string(),
            message: "Test notification from Tracker Monitor".to_string(),
            kind: EventKind::Test,
            timestamp: Utc::now(),
        }
    }

    pub fn headline(&self) -> String {
        match self.kind {
            EventKind::Opened => format!("🚀 {} - Signup Open!", self.target),
            EventKind::InvitesFound(_) => format!("🎟️ {} - Invites Found!", self.target),
            EventKind::Test => "🧪 Test Notification".to_string(),
        }
    }

    pub fn items(&self) -> &[ScanItem] {
        match &self.kind {
            EventKind::InvitesFound(items) => items,
            EventKind::Opened | EventKind::Test => &[],
        }
    }

    /// Plain-text body: the message followed by the listed items.
    ///
    /// At most `MAX_ITEMS_PER_MESSAGE` items are listed and the result is
    /// capped at `MAX_MESSAGE_CHARS`.
    pub fn body(&self) -> String {
        let mut body = self.message.clone();
        let items = self.items();
        for item in items.iter().take(MAX_ITEMS_PER_MESSAGE) {
            body.push_str(&format!("\n\n• {} ({})\n{}", item.title, item.source, item.url));
        }
        if items.len() > MAX_ITEMS_PER_MESSAGE {
            body.push_str(&format!(
                "\n\n…and {} more",
                items.len() - MAX_ITEMS_PER_MESSAGE
            ));
        }
        truncate_chars(&body, MAX_MESSAGE_CHARS)
    }
}

/// A configured delivery channel.
#[derive(Debug, Clone)]
pub enum Sink {
    Discord(DiscordSink),
    Email(EmailSink),
    Telegram(TelegramSink),
    Webhook(WebhookSink),
}

impl Sink {
    pub fn name(&self) -> &'static str {
        match self {
            Sink::Discord(_) => "Discord",
            Sink::Email(_) => "Email",
            Sink::Telegram(_) => "Telegram",
            Sink::Webhook(_) => "Webhook",
        }
    }

    pub async fn send(
        &self,
        client: &reqwest::Client,
        event: &NotificationEvent,
    ) -> Result<(), NotifyError> {
        match self {
            Sink::Discord(s) => s.send(client, event).await,
            Sink::Email(s) => s.send(event).await,
            Sink::Telegram(s) => s.send(client, event).await,
            Sink::Webhook(s) => s.send(client, event).await,
        }
    }
}

/// Builds the enabled sinks, reporting incomplete ones.
///
/// Each `Err` names a channel that is enabled but unusable; it is left out
/// of the `Ok` list.
pub fn sinks_from_config(config: &NotificationsConfig) -> (Vec<Sink>, Vec<ConfigError>) {
    let mut sinks = Vec::new();
    let mut problems = Vec::new();
    let mut require = |channel: &'static str, field: &'static str, value: &str| {
        let ok = !value.trim().is_empty();
        if !ok {
            problems.push(ConfigError::IncompleteChannel { channel, field });
        }
        ok
    };

    if config.discord.enabled && require("discord", "webhook_url", &config.discord.webhook_url) {
        sinks.push(Sink::Discord(DiscordSink::new(
            config.discord.webhook_url.clone(),
        )));
    }
    if config.telegram.enabled {
        let token_ok = require("telegram", "bot_token", &config.telegram.bot_token);
        let chat_ok = require("telegram", "chat_id", &config.telegram.chat_id);
        if token_ok && chat_ok {
            sinks.push(Sink::Telegram(TelegramSink::new(
                config.telegram.api_url.clone(),
                config.telegram.bot_token.clone(),
                config.telegram.chat_id.clone(),
            )));
        }
    }
    if config.webhook.enabled && require("webhook", "url", &config.webhook.url) {
        sinks.push(Sink::Webhook(WebhookSink::new(config.webhook.url.clone())));
    }
    if config.email.enabled {
        let server_ok = require("email", "smtp_server", &config.email.smtp_server);
        let from_ok = require("email", "from_address", &config.email.from_address);
        let to_ok = require("email", "to_address", &config.email.to_address);
        if server_ok && from_ok && to_ok {
            match EmailSink::from_config(&config.email) {
                Ok(sink) => sinks.push(Sink::Email(sink)),
                Err(e) => problems.push(e),
            }
        }
    }
    (sinks, problems)
}

/// Fans events out to all sinks.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Arc<reqwest::Client>,
    sinks: Vec<Sink>,
}

impl Notifier {
    pub fn new(client: Arc<reqwest::Client>, sinks: Vec<Sink>) -> Self {
        Self { client, sinks }
    }

    /// Builds the notifier, logging unusable channels once.
    pub fn from_config(client: Arc<reqwest::Client>, config: &NotificationsConfig) -> Self {
        let (sinks, problems) = sinks_from_config(config);
        for problem in problems {
            warn!("Notification channel disabled: {}", problem);
        }
        if sinks.is_empty() {
            warn!("No notification channels configured; events will only be logged");
        } else {
            let names: Vec<&str> = sinks.iter().map(Sink::name).collect();
            info!("Notification channels: {}", names.join(", "));
        }
        Self::new(client, sinks)
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    /// Sends `event` to every sink and returns how many accepted it.
    pub async fn deliver(&self, event: &NotificationEvent) -> usize {
        let mut delivered = 0;
        for (sink, result) in self.deliver_each(event).await {
            match result {
                Ok(()) => {
                    info!("{} notification sent for {}", sink, event.target);
                    delivered += 1;
                }
                Err(e) => error!(
                    "Failed to send {} notification for {}: {}",
                    sink, event.target, e
                ),
            }
        }
        delivered
    }

    /// Sends `event` to every sink and returns each sink's outcome.
    pub async fn deliver_each(
        &self,
        event: &NotificationEvent,
    ) -> Vec<(&'static str, Result<(), NotifyError>)> {
        let mut outcomes = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            outcomes.push((sink.name(), sink.send(&self.client, event).await));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailConfig, WebhookConfig};
    use crate::matching::MatchStrategy;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    pub(super) fn alpha() -> Target {
        Target {
            name: "AlphaTracker".to_string(),
            url: "https://alpha.example/".to_string(),
            signup_url: "https://alpha.example/signup".to_string(),
            strategy: MatchStrategy::text_match(&["open"], &[]),
            use_flaresolverr: None,
            scan_invites: true,
        }
    }

    #[test]
    fn test_opened_event() {
        let event = NotificationEvent::opened(&alpha());
        assert_eq!(event.message, "Registration is now open at AlphaTracker!");
        assert_eq!(event.action_url, "https://alpha.example/signup");
        assert_eq!(event.headline(), "🚀 AlphaTracker - Signup Open!");
        assert_eq!(event.body(), event.message);
        assert_eq!(event.kind.status(), "open");
    }

    #[test]
    fn test_invites_body_lists_items_with_overflow() {
        let items: Vec<ScanItem> = (0..12)
            .map(|i| ScanItem::new("r/OpenSignups", format!("post {}", i), format!("https://r/{}", i)))
            .collect();
        let event = NotificationEvent::invites_found(&alpha(), items);
        assert_eq!(event.message, "Found 12 new invite mentions for AlphaTracker");
        let body = event.body();
        assert!(body.contains("• post 0 (r/OpenSignups)\nhttps://r/0"));
        assert!(body.contains("• post 9"));
        assert!(!body.contains("• post 10"));
        assert!(body.ends_with("…and 2 more"));
        assert_eq!(event.kind.status(), "invites_found");
    }

    #[test]
    fn test_incomplete_channels_are_reported() {
        let mut config = NotificationsConfig::default();
        config.discord.enabled = true;
        config.telegram.enabled = true;
        config.telegram.bot_token = "token".into();
        config.webhook = WebhookConfig {
            enabled: true,
            url: "http://hook.example/".into(),
        };

        let (sinks, problems) = sinks_from_config(&config);
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name(), "Webhook");
        assert_eq!(
            problems,
            vec![
                ConfigError::IncompleteChannel {
                    channel: "discord",
                    field: "webhook_url"
                },
                ConfigError::IncompleteChannel {
                    channel: "telegram",
                    field: "chat_id"
                },
            ]
        );
    }

    #[test]
    fn test_email_channel_validation() {
        let mut config = NotificationsConfig::default();
        config.email = EmailConfig {
            enabled: true,
            smtp_server: "smtp.example.org".into(),
            ..EmailConfig::default()
        };
        let (sinks, problems) = sinks_from_config(&config);
        assert!(sinks.is_empty());
        assert_eq!(
            problems,
            vec![
                ConfigError::IncompleteChannel {
                    channel: "email",
                    field: "from_address"
                },
                ConfigError::IncompleteChannel {
                    channel: "email",
                    field: "to_address"
                },
            ]
        );

        config.email.from_address = "monitor@example.org".into();
        config.email.to_address = "nobody".into();
        let (sinks, problems) = sinks_from_config(&config);
        assert!(sinks.is_empty());
        assert_eq!(
            problems,
            vec![ConfigError::InvalidEmailAddress("nobody".into())]
        );

        config.email.to_address = "Ops <ops@example.org>".into();
        let (sinks, problems) = sinks_from_config(&config);
        assert!(problems.is_empty());
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name(), "Email");
    }

    #[tokio::test]
    async fn test_deliver_isolates_failing_sink() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/broken"))
                .respond_with(status_code(500)),
        );
        server.expect(
            Expectation::matching(request::method_path("POST", "/hook"))
                .respond_with(status_code(200)),
        );

        let notifier = Notifier::new(
            Arc::new(reqwest::Client::new()),
            vec![
                Sink::Discord(DiscordSink::new(server.url_str("/broken"))),
                Sink::Webhook(WebhookSink::new(server.url_str("/hook"))),
            ],
        );
        let delivered = notifier.deliver(&NotificationEvent::opened(&alpha())).await;
        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn test_deliver_without_sinks() {
        let notifier = Notifier::new(Arc::new(reqwest::Client::new()), Vec::new());
        assert_eq!(notifier.deliver(&NotificationEvent::opened(&alpha())).await, 0);
    }
}
