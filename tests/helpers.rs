// Shared test helpers for building configurations against a mock server.

use std::path::Path;

use httptest::Server;
use tracker_watch::FileConfig;

/// A tracker entry using text matching on `path` of the mock server.
pub fn text_tracker(server: &Server, name: &str, path: &str) -> String {
    format!(
        "  - name: {name}\n    url: {url}\n    match_text: [\"open\"]\n    not_match_text: [\"closed\"]\n",
        name = name,
        url = server.url_str(path)
    )
}

/// A configuration with a webhook sink at `/hook`, no inter-target delay and
/// the given state file. `extra` is appended verbatim (top-level keys).
pub fn config_with(server: &Server, state: &Path, trackers: &[String], extra: &str) -> FileConfig {
    let yaml = format!(
        "check_delay_seconds: 0\nstate_file: {state}\nnotifications:\n  webhook:\n    enabled: true\n    url: {hook}\ntrackers:\n{trackers}{extra}",
        state = state.display(),
        hook = server.url_str("/hook"),
        trackers = trackers.concat(),
        extra = extra
    );
    FileConfig::from_yaml(&yaml).expect("test configuration should parse")
}
