use chrono::{DateTime, Duration, Utc};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::client::DEFAULT_BASE_URL;
use crate::error::ApiError;

/// Idle sessions older than this are logged out on the next load.
pub const INACTIVITY_TIMEOUT: Duration = Duration::minutes(10);

pub const BASE_URL_ENV: &str = "TANEDU_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub base_url: String,
    pub token: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), token: None, last_activity: None }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // TOML is the primary format; a JSON state file from older builds is converted on first load
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("tanedu.toml"))
    }

    fn legacy_json_path() -> Option<PathBuf> {
        let proj = directories::ProjectDirs::from("hu", "tanedu", "TanEdu")?;
        Some(proj.config_dir().join("state.json"))
    }

    /// Load from the user config dir, then apply the env override and the idle timeout.
    pub fn load() -> Self {
        let mut state = Self::toml_path()
            .and_then(|p| Self::load_from(&p))
            .or_else(Self::migrate_legacy)
            .unwrap_or_default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                state.base_url = url;
            }
        }
        state.expire_idle(Utc::now());
        state
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let text = fs::read_to_string(path).ok()?;
        match toml::from_str::<AppState>(&text) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {}", path.display(), e);
                None
            }
        }
    }

    fn migrate_legacy() -> Option<Self> {
        let legacy = Self::legacy_json_path()?;
        let bytes = fs::read(&legacy).ok()?;
        let state = serde_json::from_slice::<AppState>(&bytes).ok()?;
        if let Err(e) = state.save() {
            log::warn!("could not migrate {}: {}", legacy.display(), e);
        }
        Some(state)
    }

    pub fn save(&self) -> Result<(), ApiError> {
        let path = Self::toml_path().ok_or_else(|| ApiError::Config("no config dir".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ApiError::Config(e.to_string()))?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| ApiError::Config(e.to_string()))?;
        fs::write(path, toml).map_err(|e| ApiError::Config(e.to_string()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Drop the token when the last activity is older than [`INACTIVITY_TIMEOUT`].
    /// Returns whether the session was expired.
    pub fn expire_idle(&mut self, now: DateTime<Utc>) -> bool {
        let idle = match self.last_activity {
            Some(at) => now - at > INACTIVITY_TIMEOUT,
            None => self.token.is_some(),
        };
        if idle && self.token.is_some() {
            log::info!("session idle since {:?}, logging out", self.last_activity);
            self.logout();
            return true;
        }
        false
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
    }

    pub fn login(&mut self, token: String, now: DateTime<Utc>) {
        self.token = Some(token);
        self.touch(now);
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.last_activity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tanedu.toml");
        let mut state = AppState::new();
        state.login("tok".into(), Utc::now());
        state.save_to(&path).unwrap();
        assert_eq!(AppState::load_from(&path), Some(state));
    }

    #[test]
    fn garbage_config_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tanedu.toml");
        fs::write(&path, "base_url = [").unwrap();
        assert_eq!(AppState::load_from(&path), None);
        assert_eq!(AppState::load_from(&dir.path().join("missing.toml")), None);
    }

    #[test]
    fn idle_session_is_logged_out() {
        let now = Utc::now();
        let mut state = AppState::new();
        state.login("tok".into(), now - Duration::minutes(11));
        assert!(state.expire_idle(now));
        assert!(!state.is_logged_in());
    }

    #[test]
    fn recent_session_is_kept() {
        let now = Utc::now();
        let mut state = AppState::new();
        state.login("tok".into(), now - Duration::minutes(3));
        assert!(!state.expire_idle(now));
        assert_eq!(state.token.as_deref(), Some("tok"));
    }

    #[test]
    fn default_points_at_local_backend() {
        let state = AppState::default();
        assert_eq!(state.base_url, "http://localhost:8080/api");
        assert!(!state.is_logged_in());
    }
}
