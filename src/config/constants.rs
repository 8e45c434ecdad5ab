//! Configuration constants.
//!
//! Timeouts, limits and defaults used throughout the application. Values that
//! users commonly tune are also exposed through the YAML configuration; the
//! constants here are the fallbacks.

use std::time::Duration;

/// Default configuration file path (container layout).
pub const DEFAULT_CONFIG_PATH: &str = "/config/config.yaml";
/// Default state file path (container layout).
pub const DEFAULT_STATE_PATH: &str = "/config/state.json";

/// Browser-like User-Agent for direct page requests.
///
/// Tracker sites commonly sit behind bot protection that rejects obvious
/// library user agents, so requests present as desktop Chrome.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Network operation timeouts
/// Timeout for a direct page request (connect + redirects + body)
pub const DIRECT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// TCP connection timeout
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Added on top of the proxy's own `maxTimeout` budget
pub const PROXY_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);
/// Timeout for a notification request
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

// Redirect handling
/// Maximum number of redirect hops to follow
pub const MAX_REDIRECT_HOPS: usize = 10;

// Bypass proxy (FlareSolverr v1 API)
pub const DEFAULT_PROXY_URL: &str = "http://flaresolverr:8191/v1";
/// Milliseconds the proxy may spend solving a challenge
pub const DEFAULT_PROXY_MAX_TIMEOUT_MS: u64 = 60_000;

// Scheduling
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 10;
pub const DEFAULT_CHECK_DELAY_SECS: u64 = 2;
pub const DEFAULT_INVITE_SCAN_INTERVAL_MINUTES: u64 = 30;
pub const DEFAULT_SCAN_REQUEST_DELAY_SECS: u64 = 2;
/// Pause after an unexpected failure of a whole cycle
pub const LOOP_ERROR_COOLDOWN: Duration = Duration::from_secs(60);

// Invite scanning
/// Maximum number of keys retained per seen-set
pub const SEEN_SET_CAPACITY: usize = 500;
pub const DEFAULT_REDDIT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_WEB_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_MAX_POST_AGE_HOURS: u64 = 24;
/// Ten years; Reddit's widest time filter is `all`
pub const MAX_POST_AGE_HOURS: u64 = 87_600;
/// Results requested per subreddit search
pub const REDDIT_SEARCH_LIMIT: u32 = 25;
/// Characters of context kept on each side of a custom-URL match
pub const SNIPPET_RADIUS_CHARS: usize = 150;
/// Characters kept from a Reddit self-post body
pub const MAX_POST_SNIPPET_CHARS: usize = 300;

// Notifications
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
/// SMTP submission port
pub const DEFAULT_SMTP_PORT: u16 = 587;
/// Discord embed colour (green)
pub const DISCORD_EMBED_COLOR: u32 = 3_066_993;
/// Items listed individually in an invite notification
pub const MAX_ITEMS_PER_MESSAGE: usize = 10;
/// Telegram rejects messages above 4096 characters
pub const MAX_MESSAGE_CHARS: usize = 4000;
