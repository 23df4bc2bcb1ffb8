//! Session context and credential storage
//!
//! The signed-in state lives in a [`SessionContext`] that is injected into
//! the API client and the views. It is restored from a [`CredentialStore`]
//! at startup, initialised on sign-in and torn down on sign-out or when the
//! server answers 401.

use super::error::ApiError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the serialized [`AdminUser`]
pub const USER_KEY: &str = "user";

/// Opaque key-value persistence for credentials
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Credentials kept as a JSON object in a file
pub struct FileCredentialStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// Open (or lazily create) the store at `path`; unreadable files start empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// `config_dir/tshop/credentials.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tshop").join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// In-memory credentials (tests, `--no-persist` style setups)
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// The signed-in administrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AdminUser {
    /// Name if known, else email
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone)]
struct Session {
    token: String,
    user: Option<AdminUser>,
}

/// Shared signed-in state
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    /// Restore the session from whatever the store holds
    pub fn restore(store: Arc<dyn CredentialStore>) -> Self {
        let current = store
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(|token| Session {
                token,
                user: store
                    .get(USER_KEY)
                    .and_then(|u| serde_json::from_str(&u).ok()),
            });

        if current.is_some() {
            tracing::debug!("Restored stored session");
        }

        Self {
            store,
            current: RwLock::new(current),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<AdminUser> {
        self.read().as_ref().and_then(|s| s.user.clone())
    }

    pub fn is_active(&self) -> bool {
        self.read().is_some()
    }

    /// Token for an authenticated call, or [`ApiError::SessionRequired`]
    pub fn gate(&self) -> Result<String, ApiError> {
        self.token().ok_or(ApiError::SessionRequired)
    }

    /// Start a session after a successful sign-in
    pub fn init(&self, token: &str, user: Option<AdminUser>) -> Result<()> {
        *self.write() = Some(Session {
            token: token.to_string(),
            user: user.clone(),
        });

        self.store.set(TOKEN_KEY, token)?;
        match user {
            Some(user) => self.store.set(USER_KEY, &serde_json::to_string(&user)?)?,
            None => self.store.remove(USER_KEY)?,
        }
        Ok(())
    }

    /// End the session; returns whether one was active
    pub fn teardown(&self) -> bool {
        let was_active = self.write().take().is_some();

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to remove stored {}: {}", key, e);
            }
        }
        was_active
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_and_teardown() {
        let store = Arc::new(MemoryCredentialStore::with_token("abc"));
        let session = SessionContext::restore(store.clone());
        assert_eq!(session.gate().unwrap(), "abc");

        assert!(session.teardown());
        assert!(!session.teardown(), "second teardown is a no-op");
        assert!(matches!(session.gate(), Err(ApiError::SessionRequired)));
        assert!(store.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_init_persists_user() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = SessionContext::restore(store.clone());
        assert!(!session.is_active());

        let user = AdminUser {
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        session.init("tok", Some(user.clone())).unwrap();

        let restored = SessionContext::restore(store);
        assert_eq!(restored.token().as_deref(), Some("tok"));
        assert_eq!(restored.user(), Some(user));
        assert_eq!(restored.user().unwrap().display_name(), "Ada");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::open(&path);
        store.set(TOKEN_KEY, "secret").unwrap();
        assert!(path.exists());

        let reopened = FileCredentialStore::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("secret"));

        reopened.remove(TOKEN_KEY).unwrap();
        assert!(FileCredentialStore::open(&path).get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileCredentialStore::open(&path).get(TOKEN_KEY).is_none());
    }
}
