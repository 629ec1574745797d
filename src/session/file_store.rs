//! Session persistence in an embedded database
//!
//! Keeps the session in a `sled` database under the user's data directory.
//! Both keys are written and removed in a single batch so a crash cannot
//! leave a token without its profile, and the database is flushed after
//! every change.
//!
//! `sled` holds an exclusive lock on the database directory, so open
//! handles are shared per path within the process. A second store for the
//! same profile reuses the first handle instead of racing for the lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use directories::ProjectDirs;
use sled::Db;

use super::{assemble_session, encode_profile, Session, SessionStore, TOKEN_KEY, USER_DATA_KEY};
use crate::error::{IssueDeskError, Result};

/// `sled`-backed [`SessionStore`].
///
/// # Examples
///
/// ```
/// use issuedesk::session::{FileSessionStore, Session, SessionStore};
///
/// # #[tokio::main]
/// # async fn main() -> issuedesk::error::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileSessionStore::open(dir.path().join("session"))?;
/// store.save(&Session::new("T1", "x", "e@x.com")).await?;
/// assert_eq!(store.load().await?.unwrap().token, "T1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    db: Db,
}

fn open_databases() -> &'static Mutex<HashMap<PathBuf, Db>> {
    static DATABASES: OnceLock<Mutex<HashMap<PathBuf, Db>>> = OnceLock::new();
    DATABASES.get_or_init(|| Mutex::new(HashMap::new()))
}

impl FileSessionStore {
    /// Opens or creates the session database at `path`.
    ///
    /// Stores opened for the same path share one database handle.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Storage`] if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let mut databases = open_databases()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(db) = databases.get(&key) {
            tracing::debug!("Reusing session database at {}", key.display());
            return Ok(Self { db: db.clone() });
        }

        let db = sled::open(path).map_err(|e| {
            IssueDeskError::Storage(format!(
                "Failed to open session database at {}: {}",
                path.display(),
                e
            ))
        })?;
        let key = std::fs::canonicalize(path).unwrap_or(key);
        databases.insert(key, db.clone());
        Ok(Self { db })
    }

    /// Default database location for a profile inside the platform data
    /// directory.
    pub fn default_path(profile: &str) -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "issuedesk", "issuedesk").ok_or_else(|| {
            IssueDeskError::Storage("Could not determine data directory".to_string())
        })?;
        Ok(dirs.data_dir().join("sessions").join(profile))
    }

    fn read(db: &Db, key: &str) -> Result<Option<String>> {
        match db.get(key)? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| IssueDeskError::Storage(format!("{} is not UTF-8: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Db) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(db))
            .await
            .map_err(|e| IssueDeskError::Storage(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let token = session.token.clone();
        let profile = encode_profile(session)?;
        self.blocking(move |db| {
            let mut batch = sled::Batch::default();
            batch.insert(TOKEN_KEY, token.as_bytes());
            batch.insert(USER_DATA_KEY, profile.as_bytes());
            db.apply_batch(batch)?;
            db.flush()?;
            Ok(())
        })
        .await
    }

    async fn load(&self) -> Result<Option<Session>> {
        self.blocking(|db| {
            let token = Self::read(&db, TOKEN_KEY)?;
            let user_data = Self::read(&db, USER_DATA_KEY)?;
            assemble_session(token, user_data)
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|db| {
            let mut batch = sled::Batch::default();
            batch.remove(TOKEN_KEY);
            batch.remove(USER_DATA_KEY);
            db.apply_batch(batch)?;
            db.flush()?;
            Ok(())
        })
        .await
    }
}
