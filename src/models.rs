//! Core domain types shared across modules.

use crate::matching::MatchStrategy;

/// A monitored tracker signup page.
///
/// Built from a validated configuration entry and immutable for the lifetime
/// of the monitor.
#[derive(Debug, Clone)]
pub struct Target {
    /// Unique identity; also the key of persisted state
    pub name: String,
    /// Page that is fetched and evaluated
    pub url: String,
    /// Link surfaced in notifications
    pub signup_url: String,
    /// How fetched content is turned into a verdict
    pub strategy: MatchStrategy,
    /// Per-target bypass proxy override; `None` follows the global setting
    pub use_flaresolverr: Option<bool>,
    /// Whether secondary sources are scanned for this tracker's invites
    pub scan_invites: bool,
}
