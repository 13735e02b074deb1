use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::error::ApiError;
use crate::mutation::MutationDispatcher;
use crate::notification::NotificationCenter;
use crate::query::{CachePolicy, QueryCache};
use crate::session::{Session, SessionError, SessionStore, SessionUser};
use crate::types::Config;
use crate::util::atomic_write_str;

/// Overrides the state directory (default `~/.supportdesk`).
pub const HOME_ENV: &str = "SUPPORTDESK_HOME";
/// Overrides `apiBaseUrl` from the config file.
pub const API_URL_ENV: &str = "SUPPORTDESK_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find home directory")]
    NoHome,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write config: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Shared console state: configuration, API client, cache, notifications
/// and the signed-in session.
pub struct AppState {
    pub config: RwLock<Config>,
    pub api: ApiClient,
    pub cache: Arc<QueryCache>,
    pub notifications: Arc<NotificationCenter>,
    session: RwLock<Session>,
    session_store: Option<SessionStore>,
}

impl AppState {
    /// Build state over an explicit transport. With a store, the persisted
    /// session is restored; a corrupt session file reads as signed out.
    pub fn new(config: Config, transport: Arc<dyn Transport>, session_store: Option<SessionStore>) -> Self {
        let session = match session_store.as_ref().map(SessionStore::load) {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                log::warn!("Ignoring unreadable session: {e}");
                Session::default()
            }
            None => Session::default(),
        };

        let api = ApiClient::new(transport);
        if session.is_authenticated() {
            api.set_token(session.token.clone());
        }

        Self {
            cache: Arc::new(QueryCache::new(CachePolicy::from(&config))),
            config: RwLock::new(config),
            api,
            notifications: Arc::new(NotificationCenter::new()),
            session: RwLock::new(session),
            session_store,
        }
    }

    /// Production wiring: reqwest transport and `session.json` in the state dir.
    pub fn from_config(config: Config) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let store = session_path()
            .map(SessionStore::new)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::new(config, Arc::new(transport), Some(store)))
    }

    pub fn dispatcher(&self) -> MutationDispatcher {
        MutationDispatcher::new(self.cache.clone(), self.notifications.clone())
    }

    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Replace the session, persist it, and point the API client at its token.
    pub fn set_session(&self, session: Session) -> Result<(), SessionError> {
        if let Some(store) = &self.session_store {
            if session.is_authenticated() {
                store.save(&session)?;
            } else {
                store.clear()?;
            }
        }
        self.api.set_token(session.token.clone());
        *self.session.write() = session;
        Ok(())
    }

    /// The signed-in account, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<SessionUser, ApiError> {
        let session = self.session.read();
        if !session.is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }
        session.user_data.clone().ok_or(ApiError::Unauthenticated)
    }

    pub fn page_size(&self) -> usize {
        self.config.read().page_size.max(1)
    }
}

/// State directory: `$SUPPORTDESK_HOME`, else `~/.supportdesk`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    Ok(home.join(".supportdesk"))
}

/// Get the canonical config file path (~/.supportdesk/config.json)
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json"))
}

pub fn session_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("session.json"))
}

/// Load configuration, falling back to defaults when no file exists, then
/// apply environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = load_config_from(&config_path()?)?;
    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.api_base_url = url.trim().to_string();
        }
    }
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `mutator` to the in-memory config and write config.json atomically.
pub fn create_or_update_config(
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, ConfigError> {
    create_or_update_config_at(&config_path()?, state, mutator)
}

fn create_or_update_config_at(
    path: &Path,
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, ConfigError> {
    let mut guard = state.config.write();
    let mut config = guard.clone();
    mutator(&mut config);

    let content = serde_json::to_string_pretty(&config)?;
    atomic_write_str(path, &content)?;

    *guard = config.clone();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::types::{EntityId, Role};

    fn state_with_store(dir: &Path) -> AppState {
        AppState::new(
            Config::default(),
            Arc::new(FakeTransport::new()),
            Some(SessionStore::new(dir.join("session.json"))),
        )
    }

    fn agent_session() -> Session {
        Session::from_login(
            Some(SessionUser {
                id: EntityId::from(7u64),
                role: Some(Role::Agent),
                ..SessionUser::default()
            }),
            Some("tok".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_bad_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_create_or_update_config_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(dir.path());
        let path = dir.path().join("config.json");

        let updated = create_or_update_config_at(&path, &state, |c| c.page_size = 25).unwrap();
        assert_eq!(updated.page_size, 25);
        assert_eq!(state.page_size(), 25);
        assert_eq!(load_config_from(&path).unwrap().page_size, 25);
    }

    #[test]
    fn test_session_persists_across_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(dir.path());
        assert!(matches!(state.require_user(), Err(ApiError::Unauthenticated)));

        state.set_session(agent_session()).unwrap();
        assert!(state.api.has_token());

        let restored = state_with_store(dir.path());
        assert_eq!(restored.require_user().unwrap().id.as_str(), "7");
        assert!(restored.api.has_token());

        restored.set_session(Session::default()).unwrap();
        assert!(!dir.path().join("session.json").exists());
        assert!(!restored.api.has_token());
    }

    #[test]
    fn test_corrupt_session_reads_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("session.json"), "garbage").unwrap();
        let state = state_with_store(dir.path());
        assert!(!state.session().is_authenticated());
    }
}
