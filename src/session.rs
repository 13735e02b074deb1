//! Signed-in session: token, account and role, persisted between runs.
//!
//! Stored as `session.json` next to the config with owner-only permissions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{EntityId, Role};
use crate::util::{atomic_write_str, restrict_permissions};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write session file: {0}")]
    Write(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Login response is missing the account or the token")]
    Incomplete,
}

/// Account attached to the session, as returned by login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub auth_status: bool,
    #[serde(default)]
    pub user_data: Option<SessionUser>,
    #[serde(default)]
    pub token: Option<String>,
}

impl Session {
    /// Accept a login only when both the account and the token are present.
    pub fn from_login(user: Option<SessionUser>, token: Option<String>) -> Result<Self, SessionError> {
        match (user, token.filter(|t| !t.trim().is_empty())) {
            (Some(user), Some(token)) => Ok(Self {
                auth_status: true,
                user_data: Some(user),
                token: Some(token),
            }),
            _ => Err(SessionError::Incomplete),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_status && self.token.is_some() && self.user_data.is_some()
    }

    pub fn role(&self) -> Option<&Role> {
        self.user_data.as_ref().and_then(|u| u.role.as_ref())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user_data.as_ref()
    }

    pub fn user_id(&self) -> Option<&EntityId> {
        self.user_data.as_ref().map(|u| &u.id)
    }

    pub fn logout(&mut self) {
        *self = Session::default();
    }
}

/// File-backed session persistence.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as signed out.
    pub fn load(&self) -> Result<Session, SessionError> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| SessionError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(session)?;
        atomic_write_str(&self.path, &content)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SessionUser {
        SessionUser {
            id: EntityId::from(1u64),
            role: Some(Role::Admin),
            first_name: Some("Ada".into()),
            last_name: Some("Ops".into()),
            ..SessionUser::default()
        }
    }

    #[test]
    fn test_login_requires_user_and_token() {
        assert!(matches!(
            Session::from_login(Some(admin()), None),
            Err(SessionError::Incomplete)
        ));
        assert!(matches!(
            Session::from_login(None, Some("t".into())),
            Err(SessionError::Incomplete)
        ));
        assert!(matches!(
            Session::from_login(Some(admin()), Some("  ".into())),
            Err(SessionError::Incomplete)
        ));

        let session = Session::from_login(Some(admin()), Some("t".into())).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(&Role::Admin));
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), Session::default());

        let session = Session::from_login(Some(admin()), Some("tok".into())).unwrap();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.load().unwrap().is_authenticated());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&Session::default()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(admin().display_name(), "Ada Ops");
        let user = SessionUser {
            email: Some("ops@example.com".into()),
            ..SessionUser::default()
        };
        assert_eq!(user.display_name(), "ops@example.com");
    }

    #[test]
    fn test_logout_resets() {
        let mut session = Session::from_login(Some(admin()), Some("tok".into())).unwrap();
        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.token.is_none());
    }
}
