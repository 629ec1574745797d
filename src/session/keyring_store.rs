//! Session persistence via OS keyring
//!
//! Stores the session in the operating system's native credential store
//! (Keychain on macOS, Secret Service on Linux, Windows Credential Manager
//! on Windows). The token and the JSON profile are two separate entries of
//! the same keyring service.
//!
//! Keyring calls block, so each operation runs on the blocking thread pool.

use async_trait::async_trait;

use super::{assemble_session, encode_profile, Session, SessionStore, TOKEN_KEY, USER_DATA_KEY};
use crate::error::{IssueDeskError, Result};

/// Keyring-backed [`SessionStore`].
///
/// Each profile gets its own keyring service name, so several accounts can
/// be kept side by side on one machine.
///
/// # Examples
///
/// ```no_run
/// use issuedesk::session::{KeyringSessionStore, Session, SessionStore};
///
/// # async fn example() -> issuedesk::error::Result<()> {
/// let store = KeyringSessionStore::new("default");
/// store.save(&Session::new("token", "x", "e@x.com")).await?;
/// assert!(store.load().await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    /// Creates an accessor for the given profile. No keyring I/O happens here.
    pub fn new(profile: &str) -> Self {
        Self {
            service: Self::service_name(profile),
        }
    }

    /// Builds the keyring service name for a profile.
    ///
    /// The name is prefixed with `issuedesk-` to avoid collisions with other
    /// applications that use the same keyring.
    fn service_name(profile: &str) -> String {
        format!("issuedesk-{}", profile)
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, key)?)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(KeyringSessionStore) -> Result<T> + Send + 'static,
    {
        let this = self.clone();
        tokio::task::spawn_blocking(move || op(this))
            .await
            .map_err(|e| IssueDeskError::Storage(format!("keyring task failed: {}", e)))?
    }
}

#[async_trait]
impl SessionStore for KeyringSessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let token = session.token.clone();
        let profile = encode_profile(session)?;
        self.blocking(move |store| {
            store.write(TOKEN_KEY, &token)?;
            store.write(USER_DATA_KEY, &profile)
        })
        .await
    }

    async fn load(&self) -> Result<Option<Session>> {
        self.blocking(|store| {
            let token = store.read(TOKEN_KEY)?;
            let user_data = store.read(USER_DATA_KEY)?;
            assemble_session(token, user_data)
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|store| {
            store.delete(TOKEN_KEY)?;
            store.delete(USER_DATA_KEY)
        })
        .await
    }
}
