//! YAML configuration file.
//!
//! Every section and field has a default, so a minimal file only needs a
//! `trackers` list. Unknown keys are ignored.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::config::constants::*;
use crate::error_handling::ConfigError;
use crate::matching::{MatchParams, MatchStrategy};
use crate::models::Target;

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Minutes between status polls
    pub check_interval_minutes: u64,
    /// Seconds to wait between two trackers within a poll
    pub check_delay_seconds: u64,
    /// Where the persisted state lives
    pub state_file: PathBuf,
    /// Bypass proxy settings
    pub flaresolverr: FlareSolverrConfig,
    /// Notification sinks
    pub notifications: NotificationsConfig,
    /// Monitored trackers, in polling order
    pub trackers: Vec<TrackerConfig>,
    /// Secondary-source invite scanning
    pub invite_scan: InviteScanConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: DEFAULT_CHECK_INTERVAL_MINUTES,
            check_delay_seconds: DEFAULT_CHECK_DELAY_SECS,
            state_file: PathBuf::from(DEFAULT_STATE_PATH),
            flaresolverr: FlareSolverrConfig::default(),
            notifications: NotificationsConfig::default(),
            trackers: Vec::new(),
            invite_scan: InviteScanConfig::default(),
        }
    }
}

/// Bypass proxy (FlareSolverr) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlareSolverrConfig {
    /// Global default for trackers without their own `use_flaresolverr`
    pub enabled: bool,
    /// Proxy endpoint
    pub url: String,
    /// Milliseconds the proxy may spend per request
    pub max_timeout: u64,
}

impl Default for FlareSolverrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: DEFAULT_PROXY_URL.to_string(),
            max_timeout: DEFAULT_PROXY_MAX_TIMEOUT_MS,
        }
    }
}

/// Notification sink settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub discord: DiscordConfig,
    pub telegram: TelegramConfig,
    pub webhook: WebhookConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub enabled: bool,
    pub webhook_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
    /// Bot API base URL
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            chat_id: String::new(),
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
}

/// SMTP email settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Upgrade the connection with STARTTLS
    pub use_tls: bool,
    /// Login is attempted only when both username and password are set
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub to_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: String::new(),
            smtp_port: DEFAULT_SMTP_PORT,
            use_tls: true,
            username: None,
            password: None,
            from_address: String::new(),
            to_address: String::new(),
        }
    }
}

/// One tracker entry as written in the file.
///
/// Entries are validated into [`Target`]s by [`FileConfig::targets`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub name: Option<String>,
    pub url: Option<String>,
    /// Link surfaced in notifications; defaults to `url`
    pub signup_url: Option<String>,
    pub enabled: bool,
    /// `text_match`, `xpath` or `css_selector`
    pub method: String,
    pub match_text: Vec<String>,
    pub not_match_text: Vec<String>,
    pub xpath: Option<String>,
    pub css_selector: Option<String>,
    /// Per-tracker proxy override; `None` follows the global setting
    pub use_flaresolverr: Option<bool>,
    /// Include this tracker in invite scanning
    pub scan_invites: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            name: None,
            url: None,
            signup_url: None,
            enabled: true,
            method: "text_match".to_string(),
            match_text: Vec::new(),
            not_match_text: Vec::new(),
            xpath: None,
            css_selector: None,
            use_flaresolverr: None,
            scan_invites: true,
        }
    }
}

impl TrackerConfig {
    /// Validates the entry and compiles its matching strategy.
    ///
    /// `index` is the entry's position in the file, used when it has no name.
    pub fn to_target(&self, index: usize) -> Result<Target, ConfigError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::MissingName(index))?
            .to_string();

        let url = self.url.clone().unwrap_or_default();
        if url::Url::parse(&url).is_err() {
            return Err(ConfigError::InvalidUrl(url));
        }
        let signup_url = match &self.signup_url {
            Some(s) if !s.trim().is_empty() => {
                url::Url::parse(s).map_err(|_| ConfigError::InvalidUrl(s.clone()))?;
                s.clone()
            }
            _ => url.clone(),
        };

        let strategy = MatchStrategy::from_method(
            &self.method,
            MatchParams {
                match_text: &self.match_text,
                not_match_text: &self.not_match_text,
                xpath: self.xpath.as_deref(),
                css_selector: self.css_selector.as_deref(),
            },
        )?;

        Ok(Target {
            name,
            url,
            signup_url,
            strategy,
            use_flaresolverr: self.use_flaresolverr,
            scan_invites: self.scan_invites,
        })
    }
}

/// Invite scanning settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InviteScanConfig {
    pub enabled: bool,
    /// Minutes between scans (checked once per status poll)
    pub interval_minutes: u64,
    /// Courtesy delay between scanner requests
    pub request_delay_seconds: u64,
    /// Words that must accompany a tracker name for a mention to count
    pub keywords: Vec<String>,
    pub reddit: RedditConfig,
    pub web_search: WebSearchConfig,
    pub custom_urls: CustomUrlsConfig,
}

impl Default for InviteScanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: DEFAULT_INVITE_SCAN_INTERVAL_MINUTES,
            request_delay_seconds: DEFAULT_SCAN_REQUEST_DELAY_SECS,
            keywords: vec!["invite".to_string(), "invites".to_string()],
            reddit: RedditConfig::default(),
            web_search: WebSearchConfig::default(),
            custom_urls: CustomUrlsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub enabled: bool,
    pub subreddits: Vec<String>,
    /// Posts older than this are ignored
    pub max_age_hours: u64,
    pub base_url: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subreddits: vec!["OpenSignups".to_string(), "trackers".to_string()],
            max_age_hours: DEFAULT_MAX_POST_AGE_HOURS,
            base_url: DEFAULT_REDDIT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: DEFAULT_WEB_SEARCH_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomUrlsConfig {
    pub enabled: bool,
    pub urls: Vec<String>,
}

impl FileConfig {
    /// Loads and parses the configuration file.
    ///
    /// # Errors
    ///
    /// A missing or unparsable file is fatal: there is nothing to monitor.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Configuration file not found: {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parses configuration from YAML text. An empty document yields defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Builds the enabled, valid trackers in file order.
    ///
    /// Invalid entries are logged once and skipped, so one bad tracker never
    /// stops the others from being monitored.
    pub fn targets(&self) -> Vec<Target> {
        let mut names = HashSet::new();
        let mut targets = Vec::new();
        for (index, entry) in self.trackers.iter().enumerate() {
            if !entry.enabled {
                continue;
            }
            let label = entry
                .name
                .clone()
                .unwrap_or_else(|| format!("#{}", index));
            let target = match entry.to_target(index) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Disabling tracker {}: {}", label, e);
                    continue;
                }
            };
            if !names.insert(target.name.clone()) {
                warn!(
                    "Disabling tracker {}: {}",
                    label,
                    ConfigError::DuplicateName(target.name.clone())
                );
                continue;
            }
            targets.push(target);
        }
        info!("Loaded {} trackers to monitor", targets.len());
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
check_interval_minutes: 5
check_delay_seconds: 1
state_file: ./state.json
flaresolverr:
  enabled: true
  url: http://localhost:8191/v1
notifications:
  discord:
    enabled: true
    webhook_url: https://discord.example/hook
  email:
    enabled: true
    smtp_server: smtp.example
trackers:
  - name: AlphaTracker
    url: https://alpha.example/signup
    signup_url: https://alpha.example/register
    match_text: ["open", "register"]
    not_match_text: ["closed"]
  - name: BetaTracker
    url: https://beta.example/
    method: css_selector
    css_selector: "form#signup"
    use_flaresolverr: false
  - name: Disabled
    url: https://off.example/
    enabled: false
  - name: Broken
    url: https://broken.example/
    method: regex
invite_scan:
  enabled: true
  keywords: ["invite"]
  reddit:
    subreddits: ["OpenSignups"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = FileConfig::from_yaml(SAMPLE).expect("sample should parse");
        assert_eq!(config.check_interval_minutes, 5);
        assert_eq!(config.check_delay_seconds, 1);
        assert_eq!(config.state_file, PathBuf::from("./state.json"));
        assert!(config.flaresolverr.enabled);
        assert_eq!(config.flaresolverr.max_timeout, DEFAULT_PROXY_MAX_TIMEOUT_MS);
        assert!(config.notifications.discord.enabled);
        assert!(config.notifications.email.enabled);
        assert_eq!(config.notifications.email.smtp_port, DEFAULT_SMTP_PORT);
        assert!(config.notifications.email.use_tls);
        assert!(config.notifications.email.username.is_none());
        assert_eq!(config.trackers.len(), 4);
        assert!(config.invite_scan.enabled);
        assert!(config.invite_scan.reddit.enabled);
        assert_eq!(config.invite_scan.reddit.max_age_hours, 24);
    }

    #[test]
    fn test_targets_skip_disabled_and_invalid() {
        let config = FileConfig::from_yaml(SAMPLE).unwrap();
        let targets = config.targets();
        let names: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["AlphaTracker", "BetaTracker"]);
        assert_eq!(targets[0].signup_url, "https://alpha.example/register");
        assert_eq!(targets[1].signup_url, "https://beta.example/");
        assert_eq!(targets[1].use_flaresolverr, Some(false));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FileConfig::from_yaml("").unwrap();
        assert_eq!(config.check_interval_minutes, DEFAULT_CHECK_INTERVAL_MINUTES);
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_PATH));
        assert!(config.targets().is_empty());
        assert!(!config.invite_scan.enabled);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(FileConfig::from_yaml("trackers: [unclosed").is_err());
    }

    #[test]
    fn test_missing_name_is_config_error() {
        let entry = TrackerConfig {
            url: Some("https://x.example/".into()),
            ..Default::default()
        };
        assert_eq!(entry.to_target(3).unwrap_err(), ConfigError::MissingName(3));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let entry = TrackerConfig {
            name: Some("X".into()),
            url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(matches!(
            entry.to_target(0),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let yaml = r#"
trackers:
  - name: Same
    url: https://one.example/
  - name: Same
    url: https://two.example/
"#;
        let targets = FileConfig::from_yaml(yaml).unwrap().targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "https://one.example/");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = FileConfig::load(Path::new("/nonexistent/config.yaml")).await;
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Configuration file not found"));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = FileConfig::load(&path).await.unwrap();
        assert_eq!(config.trackers.len(), 4);
    }
}
