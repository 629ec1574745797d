//! Authentication and session lifecycle
//!
//! The session moves through **anonymous → authenticated → anonymous**:
//! [`AuthService::login`] writes a session to the store,
//! [`AuthService::logout`] and a successful
//! [`AuthService::reset_password`] remove it. Every operation returns the
//! crate-wide [`Result`], so callers handle auth failures the same way they
//! handle issue failures.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IssueDeskError, Result};
use crate::http::ApiClient;
use crate::session::{Session, SessionStore, UserProfile};

/// Where the session lifecycle currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No session stored
    Anonymous,
    /// A session is stored
    Authenticated(Session),
}

impl AuthState {
    /// Returns `true` for [`AuthState::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Result of a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// Whether the server acknowledged the logout with HTTP 200
    pub remote_confirmed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    user_name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    user_name_or_email: &'a str,
    new_password: &'a str,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("email regex: {}", e))
    })
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IssueDeskError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<()> {
    require(email, "email")?;
    if !email_pattern().is_match(email.trim()) {
        return Err(IssueDeskError::Validation(format!(
            "{:?} is not a valid email address",
            email
        )));
    }
    Ok(())
}

/// Login, signup, logout and password reset against the user endpoints.
///
/// The service writes to the same [`SessionStore`] the [`ApiClient`] reads
/// tokens from, so a successful login authenticates every later request.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use issuedesk::auth::AuthService;
/// use issuedesk::config::ApiConfig;
/// use issuedesk::http::ApiClient;
/// use issuedesk::session::MemorySessionStore;
///
/// # async fn example() -> issuedesk::error::Result<()> {
/// let client = ApiClient::new(&ApiConfig::default(), Arc::new(MemorySessionStore::new()))?;
/// let auth = AuthService::new(Arc::new(client));
/// let profile = auth.login("x", "e@x.com", "p").await?;
/// println!("signed in as {}", profile.username);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates the service over the client's session store.
    pub fn new(client: Arc<ApiClient>) -> Self {
        let store = client.session_store();
        Self { client, store }
    }

    /// Current lifecycle state, read from the store.
    pub async fn state(&self) -> Result<AuthState> {
        Ok(match self.store.load().await? {
            Some(session) => AuthState::Authenticated(session),
            None => AuthState::Anonymous,
        })
    }

    /// Logs in and persists the session.
    ///
    /// Either `username` or `email` may be empty, not both.
    ///
    /// # Errors
    ///
    /// - [`IssueDeskError::Validation`] for missing fields, before any request
    /// - [`IssueDeskError::InvalidCredentials`] on HTTP 401
    /// - [`IssueDeskError::Server`] on any other non-2xx status
    /// - [`IssueDeskError::NetworkUnavailable`] when the server is unreachable
    /// - [`IssueDeskError::Unknown`] if the response lacks a token
    /// - [`IssueDeskError::SessionPersistence`] if the session cannot be saved
    pub async fn login(&self, username: &str, email: &str, password: &str) -> Result<UserProfile> {
        if username.trim().is_empty() && email.trim().is_empty() {
            return Err(IssueDeskError::Validation(
                "username or email is required".to_string(),
            ));
        }
        if !email.trim().is_empty() {
            require_email(email)?;
        }
        require(password, "password")?;

        let credentials = Credentials {
            user_name: username.trim(),
            email: email.trim(),
            password,
        };
        let response = self
            .client
            .post("/users/login", Some(&credentials))
            .await
            .map_err(|e| match e {
                IssueDeskError::Server { status: 401, .. } => IssueDeskError::InvalidCredentials,
                other => other,
            })?;

        let body: LoginResponse = response.json()?;
        if body.token.trim().is_empty() {
            return Err(IssueDeskError::Unknown(
                "login response did not contain a token".to_string(),
            ));
        }

        let session = Session::new(body.token, body.username, body.email);
        self.store
            .save(&session)
            .await
            .map_err(|e| IssueDeskError::SessionPersistence(e.to_string()))?;

        tracing::info!(username = %session.username, "Logged in");
        Ok(session.profile())
    }

    /// Registers a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Unknown`] if the server answers with a
    /// success status other than 201.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<()> {
        require(username, "username")?;
        require_email(email)?;
        require(password, "password")?;

        let credentials = Credentials {
            user_name: username.trim(),
            email: email.trim(),
            password,
        };
        let response = self
            .client
            .post("/users/register", Some(&credentials))
            .await?;

        if response.status != 201 {
            return Err(IssueDeskError::Unknown(format!(
                "registration returned HTTP {} instead of 201",
                response.status
            )));
        }

        tracing::info!(username = %username.trim(), "Registered account");
        Ok(())
    }

    /// Logs out remotely (best effort) and always clears the local session.
    ///
    /// # Errors
    ///
    /// Fails only when the local session cannot be cleared; a failed remote
    /// call is reported through [`LogoutOutcome::remote_confirmed`].
    pub async fn logout(&self) -> Result<LogoutOutcome> {
        let remote_confirmed = match self.client.post::<()>("/users/logout", None).await {
            Ok(response) if response.status == 200 => true,
            Ok(response) => {
                tracing::warn!("Remote logout returned HTTP {}", response.status);
                false
            }
            Err(e) => {
                tracing::warn!("Remote logout failed, clearing local session anyway: {}", e);
                false
            }
        };

        self.store.clear().await?;
        tracing::info!(remote_confirmed, "Logged out");

        Ok(LogoutOutcome { remote_confirmed })
    }

    /// Sets a new password for the account named by `identifier` (username
    /// or email).
    ///
    /// On success any stored session is cleared; the old credentials no
    /// longer hold.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Server`] (404 when the user does not exist)
    /// and [`IssueDeskError::Unknown`] for a success status other than 200.
    pub async fn reset_password(&self, identifier: &str, new_password: &str) -> Result<()> {
        require(identifier, "username or email")?;
        require(new_password, "new password")?;

        let request = ResetPasswordRequest {
            user_name_or_email: identifier.trim(),
            new_password,
        };
        let response = self
            .client
            .post("/users/reset-password", Some(&request))
            .await?;

        if response.status != 200 {
            return Err(IssueDeskError::Unknown(format!(
                "password reset returned HTTP {} instead of 200",
                response.status
            )));
        }

        self.store.clear().await?;
        tracing::info!("Password reset; session cleared");
        Ok(())
    }
}
