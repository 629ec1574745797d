//! Error types for IssueDesk
//!
//! Every layer of the client (session store, HTTP adapter, auth service and
//! issue mapping layer) reports failures through [`IssueDeskError`], using
//! `thiserror` for ergonomic error handling. Callers match on the variant
//! to decide how to present the failure.

use thiserror::Error;

/// Main error type for IssueDesk operations
///
/// The first five variants form the taxonomy surfaced to callers of the
/// auth service and the issue mapping layer. The remaining variants cover
/// local concerns (configuration, storage, unknown enum codes).
#[derive(Error, Debug)]
pub enum IssueDeskError {
    /// Missing or malformed input, caught before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login rejected by the server with HTTP 401
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Non-2xx response carrying the server-provided message
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code returned by the server
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The request was sent but no response was received
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Anything not classified above, e.g. a malformed response body
    #[error("Unexpected error: {0}")]
    Unknown(String),

    /// A wire code or display label outside the fixed code tables
    #[error("Unrecognized {field} value: {value:?}")]
    UnrecognizedCode {
        /// Which table the value was looked up in ("status" or "priority")
        field: &'static str,
        /// The offending value
        value: String,
    },

    /// Login succeeded remotely but the session could not be written
    #[error("Unable to persist session: {0}")]
    SessionPersistence(String),

    /// Session storage read/write/delete failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IssueDeskError {
    /// Builds an [`IssueDeskError::UnrecognizedCode`] for the status table.
    pub fn unrecognized_status(value: impl Into<String>) -> Self {
        Self::UnrecognizedCode {
            field: "status",
            value: value.into(),
        }
    }

    /// Builds an [`IssueDeskError::UnrecognizedCode`] for the priority table.
    pub fn unrecognized_priority(value: impl Into<String>) -> Self {
        Self::UnrecognizedCode {
            field: "priority",
            value: value.into(),
        }
    }

    /// HTTP status carried by a server error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::InvalidCredentials => Some(401),
            _ => None,
        }
    }

    /// Returns `true` when the server reported the resource as missing.
    ///
    /// Deleting an issue twice surfaces the server's 404; callers use this to
    /// treat the second delete as already done.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` for connectivity failures (no response received).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    /// Human-readable message suitable for showing to the end user.
    ///
    /// # Examples
    ///
    /// ```
    /// use issuedesk::error::IssueDeskError;
    ///
    /// let err = IssueDeskError::InvalidCredentials;
    /// assert!(err.user_message().contains("username or password"));
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("Please check your input: {}", msg),
            Self::InvalidCredentials => {
                "Login failed. The username or password is incorrect.".to_string()
            }
            Self::Server { status: 404, message } if message.is_empty() => {
                "The requested item could not be found.".to_string()
            }
            Self::Server { status, message } if message.is_empty() => {
                format!("The server returned an error (HTTP {}).", status)
            }
            Self::Server { message, .. } => message.clone(),
            Self::NetworkUnavailable(_) => {
                "Unable to connect to the server. Please check your network connection."
                    .to_string()
            }
            Self::SessionPersistence(_) => {
                "Signed in, but the session could not be saved on this device.".to_string()
            }
            Self::Storage(_) => "Local session storage is unavailable.".to_string(),
            Self::Config(msg) => format!("Configuration problem: {}", msg),
            Self::UnrecognizedCode { .. } | Self::Unknown(_) => {
                "An unknown error occurred.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for IssueDeskError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Server {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            };
        }
        if err.is_builder() || err.is_decode() {
            return Self::Unknown(err.to_string());
        }
        Self::NetworkUnavailable(err.to_string())
    }
}

impl From<keyring::Error> for IssueDeskError {
    fn from(err: keyring::Error) -> Self {
        Self::Storage(format!("keyring: {}", err))
    }
}

impl From<sled::Error> for IssueDeskError {
    fn from(err: sled::Error) -> Self {
        Self::Storage(format!("sled: {}", err))
    }
}

/// Result type alias used by every client-side layer
pub type Result<T> = std::result::Result<T, IssueDeskError>;
