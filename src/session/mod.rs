//! Session persistence
//!
//! A [`Session`] is the authenticated identity of the user: the bearer token
//! handed out by the server plus the cached profile. It is owned by a single
//! [`SessionStore`] that is injected into both the HTTP client adapter and
//! the auth service, so no other code reads or writes session state.
//!
//! Backends:
//!
//! - [`KeyringSessionStore`]: OS native credential store
//! - [`FileSessionStore`]: embedded `sled` database in the data directory
//! - [`MemorySessionStore`]: process-local, for tests and throwaway runs
//!
//! Every backend keeps the token and the profile under the fixed keys
//! [`TOKEN_KEY`] and [`USER_DATA_KEY`]. A store holding only one of the two
//! loads as absent.

use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{SessionBackend, SessionConfig};
use crate::error::{IssueDeskError, Result};

pub mod file_store;
pub mod keyring_store;

pub use file_store::FileSessionStore;
pub use keyring_store::KeyringSessionStore;

/// Storage key for the raw bearer token.
pub const TOKEN_KEY: &str = "userToken";

/// Storage key for the JSON-encoded [`UserProfile`].
pub const USER_DATA_KEY: &str = "userData";

/// Profile returned by the server on login and cached with the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display username
    pub username: String,
    /// Account email address
    pub email: String,
}

/// Authenticated session: token plus cached profile.
///
/// The `Debug` output redacts the token so sessions can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Username returned by the server
    pub username: String,
    /// Email returned by the server
    pub email: String,
}

impl Session {
    /// Creates a session from its three parts.
    pub fn new(
        token: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            email: email.into(),
        }
    }

    /// The profile half of the session.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish()
    }
}

/// Durable key-value persistence of the session.
///
/// Implementations must not cache: every `load` re-reads the backing
/// storage. Writes overwrite whatever was stored before (last write wins).
///
/// # Examples
///
/// ```
/// use issuedesk::session::{MemorySessionStore, Session, SessionStore};
///
/// # #[tokio::main]
/// # async fn main() -> issuedesk::error::Result<()> {
/// let store = MemorySessionStore::new();
/// store.save(&Session::new("T1", "x", "e@x.com")).await?;
/// assert_eq!(store.token().await?.as_deref(), Some("T1"));
/// store.clear().await?;
/// assert!(store.load().await?.is_none());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes token and profile, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Storage`] if the backend rejects the write.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Returns the stored session, or `None` if never saved or cleared.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Storage`] if the backend cannot be read or
    /// the stored profile is corrupt.
    async fn load(&self) -> Result<Option<Session>>;

    /// Removes all session data. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<()>;

    /// Reads only the token of the stored session.
    async fn token(&self) -> Result<Option<String>> {
        Ok(self.load().await?.map(|session| session.token))
    }
}

/// Joins the raw values of the two storage keys into a session.
///
/// Only a store holding both keys yields a session.
pub(crate) fn assemble_session(
    token: Option<String>,
    user_data: Option<String>,
) -> Result<Option<Session>> {
    match (token, user_data) {
        (Some(token), Some(user_data)) => {
            let profile: UserProfile = serde_json::from_str(&user_data).map_err(|e| {
                IssueDeskError::Storage(format!("stored profile is corrupt: {}", e))
            })?;
            Ok(Some(Session {
                token,
                username: profile.username,
                email: profile.email,
            }))
        }
        (None, None) => Ok(None),
        _ => {
            tracing::warn!("Session storage holds a partial session; treating it as absent");
            Ok(None)
        }
    }
}

/// Serializes the profile half of a session for the [`USER_DATA_KEY`] entry.
pub(crate) fn encode_profile(session: &Session) -> Result<String> {
    serde_json::to_string(&session.profile())
        .map_err(|e| IssueDeskError::Storage(format!("failed to encode profile: {}", e)))
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| IssueDeskError::Storage("session lock poisoned".to_string()))?;
        *slot = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| IssueDeskError::Storage("session lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    async fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| IssueDeskError::Storage("session lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Opens the session store selected by configuration.
///
/// # Errors
///
/// Returns [`IssueDeskError::Storage`] if the file backend cannot open its
/// database.
pub fn open_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match config.backend {
        SessionBackend::Keyring => Arc::new(KeyringSessionStore::new(&config.profile)),
        SessionBackend::File => {
            let path = match &config.path {
                Some(dir) => dir.join(&config.profile),
                None => FileSessionStore::default_path(&config.profile)?,
            };
            Arc::new(FileSessionStore::open(path)?)
        }
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
    };
    tracing::debug!(backend = ?config.backend, profile = %config.profile, "Opened session store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_starts_empty() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());
        assert!(store.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_last_write_wins() {
        let store = MemorySessionStore::new();
        store.save(&Session::new("T1", "a", "a@x.com")).await.unwrap();
        store.save(&Session::new("T2", "b", "b@x.com")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, Session::new("T2", "b", "b@x.com"));
    }

    #[tokio::test]
    async fn test_memory_store_clear_is_idempotent() {
        let store = MemorySessionStore::with_session(Session::new("T1", "a", "a@x.com"));
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("secret-token", "x", "e@x.com");
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("e@x.com"));
    }

    #[test]
    fn test_assemble_session_requires_both_keys() {
        assert!(assemble_session(Some("T".into()), None).unwrap().is_none());
        assert!(assemble_session(None, Some("{}".into())).unwrap().is_none());
        assert!(assemble_session(None, None).unwrap().is_none());
    }

    #[test]
    fn test_assemble_session_reads_profile_json() {
        let session = assemble_session(
            Some("T1".into()),
            Some(r#"{"username":"x","email":"e@x.com"}"#.into()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(session, Session::new("T1", "x", "e@x.com"));
    }

    #[test]
    fn test_assemble_session_rejects_corrupt_profile() {
        let result = assemble_session(Some("T1".into()), Some("not json".into()));
        assert!(matches!(result, Err(IssueDeskError::Storage(_))));
    }

    #[test]
    fn test_encode_profile_omits_token() {
        let json = encode_profile(&Session::new("T1", "x", "e@x.com")).unwrap();
        assert!(!json.contains("T1"));
        assert!(json.contains("\"username\":\"x\""));
    }
}
