//! IssueDesk - issue tracker client library
//!
//! This library provides the client core of an issue tracker: session
//! persistence, an authenticated HTTP adapter, the auth lifecycle and the
//! mapping of issue and dashboard data into display form.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Session store trait and its keyring, file and memory backends
//! - `http`: HTTP client adapter attaching the bearer token to every request
//! - `auth`: Login, signup, logout and password reset
//! - `issues`: Issue CRUD, code tables, badges and the dashboard snapshot
//! - `sequence`: Request tickets for discarding stale responses
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface definition and handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use issuedesk::{ApiClient, AuthService, Config, IssueService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = issuedesk::session::open_store(&config.session)?;
//!     let client = Arc::new(ApiClient::new(&config.api, store)?);
//!     let auth = AuthService::new(Arc::clone(&client));
//!     auth.login("x", "e@x.com", "secret").await?;
//!
//!     let issues = IssueService::new(client);
//!     for issue in issues.list().await? {
//!         println!("{} {}", issue.id, issue.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod issues;
pub mod sequence;
pub mod session;

// Re-export commonly used types
pub use auth::{AuthService, AuthState, LogoutOutcome};
pub use config::Config;
pub use error::{IssueDeskError, Result};
pub use http::ApiClient;
pub use issues::{DashboardSnapshot, IssueService, UiIssue};
pub use sequence::{RequestSequencer, RequestTicket};
pub use session::{Session, SessionStore, UserProfile};
