//! State file persistence.

use std::path::PathBuf;

use log::{debug, error, info};

use super::PersistedState;
use crate::error_handling::StateError;

/// Reads and writes the state file.
///
/// State is read once at startup and written back whole at the end of each
/// cycle. Writes go to a sibling temporary file that is then renamed over
/// the real one, so a crash mid-write never leaves a truncated document.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the state, degrading to an empty state on any problem.
    ///
    /// A missing file is a normal first run. An unreadable or corrupt file is
    /// logged and treated the same way rather than stopping the monitor.
    pub async fn load(&self) -> PersistedState {
        match self.try_load().await {
            Ok(Some(state)) => {
                info!(
                    "Loaded state for {} trackers from {}",
                    state.trackers.len(),
                    self.path.display()
                );
                state
            }
            Ok(None) => {
                info!(
                    "No state file at {}, starting fresh",
                    self.path.display()
                );
                PersistedState::default()
            }
            Err(e) => {
                error!(
                    "Failed to load state from {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                PersistedState::default()
            }
        }
    }

    /// Loads the state, returning `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StateError` when the file cannot be read or parsed.
    pub async fn try_load(&self) -> Result<Option<PersistedState>, StateError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Writes the whole state atomically.
    ///
    /// # Errors
    ///
    /// Returns `StateError` when serialization or any file operation fails.
    /// The previous file, if any, is left in place.
    pub async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!("State saved to {}", self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
