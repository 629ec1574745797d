//! HTTP client adapter for the issue service
//!
//! [`ApiClient`] is the single point of egress for every remote call. It
//! fixes the base URL at construction, reads the current token from the
//! injected [`SessionStore`] before each request and, when a token exists,
//! sends it as `Authorization: Bearer <token>`.
//!
//! # Error classification
//!
//! - non-2xx response: [`IssueDeskError::Server`] with the status and the
//!   message found in the body (`title`, then `message`, then raw text)
//! - no response (connect failure, timeout, dropped connection):
//!   [`IssueDeskError::NetworkUnavailable`]
//! - local failure (bad path, unbuildable request, malformed body):
//!   [`IssueDeskError::Unknown`]
//!
//! No retries are attempted.
//!
//! Each request carries a [`RequestTicket`] from the sequencer of its
//! operation (verb plus path), see [`ApiClient::sequencer`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{IssueDeskError, Result};
use crate::sequence::{RequestSequencer, RequestTicket};
use crate::session::SessionStore;

/// An outgoing request: verb, path relative to the base URL, optional JSON
/// body and extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a request without body or extra headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Unknown`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| IssueDeskError::Unknown(format!("failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds an extra header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The request path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// Ticket issued for the request that produced this response
    pub ticket: RequestTicket,
}

impl ApiResponse {
    /// Returns `true` when the body is empty or whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Unknown`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| IssueDeskError::Unknown(format!("malformed response body: {}", e)))
    }
}

/// Configured request pipeline shared by the auth service and the issue
/// mapping layer.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use issuedesk::config::ApiConfig;
/// use issuedesk::http::ApiClient;
/// use issuedesk::session::MemorySessionStore;
///
/// # async fn example() -> issuedesk::error::Result<()> {
/// let client = ApiClient::new(&ApiConfig::default(), Arc::new(MemorySessionStore::new()))?;
/// let response = client.get("/issues/list").await?;
/// println!("{}", response.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    sequencers: Arc<Mutex<HashMap<String, Arc<RequestSequencer>>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds the client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Config`] for an invalid base URL and
    /// [`IssueDeskError::Unknown`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let base_url = config.parsed_base_url()?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder
            .build()
            .map_err(|e| IssueDeskError::Unknown(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized API client: base_url={}", base_url);

        Ok(Self {
            http,
            base_url,
            store,
            sequencers: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Base URL fixed at construction.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session store consulted before every request.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Sequencer for one operation, identified by verb and path.
    ///
    /// Tickets only advance for requests to the same operation, so an
    /// unrelated call never makes a fresh response look stale.
    pub fn sequencer(&self, method: &Method, path: &str) -> Arc<RequestSequencer> {
        let key = format!("{} /{}", method, path.trim_start_matches('/'));
        let mut sequencers = self
            .sequencers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(sequencers.entry(key).or_default())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| IssueDeskError::Unknown(format!("invalid request path {:?}: {}", path, e)))
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::GET, path)).await
    }

    /// POST `path` with an optional JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let mut request = ApiRequest::new(Method::POST, path);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request).await
    }

    /// PUT `path` with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::PUT, path).json(body)?)
            .await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::DELETE, path)).await
    }

    /// Sends a request through the pipeline.
    ///
    /// # Errors
    ///
    /// See the module documentation for the classification of failures.
    /// A failure to read the session store is returned as-is.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.endpoint(&request.path)?;
        let ticket = self.sequencer(&request.method, &request.path).issue();

        let mut builder = self.http.request(request.method.clone(), url);

        let token = self.store.token().await?;
        let authenticated = token.is_some();
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            ticket = ticket.value(),
            authenticated,
            "Sending request"
        );

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", request.method, request.path, e);
            IssueDeskError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(IssueDeskError::from)?;

        if !status.is_success() {
            let message = extract_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            tracing::error!(
                "{} {} returned error {}: {}",
                request.method,
                request.path,
                status,
                message
            );
            return Err(IssueDeskError::Server {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(
            status = status.as_u16(),
            ticket = ticket.value(),
            "{} {} completed",
            request.method,
            request.path
        );

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            ticket,
        })
    }
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies are searched for `title`, then `message`; any other
/// non-empty body is returned trimmed.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["title", "message"]
            .iter()
            .filter_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base.to_string(),
            timeout_seconds: None,
        };
        ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn test_extract_message_prefers_title() {
        let body = r#"{"title":"Bad Request","message":"ignored"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Bad Request"));
    }

    #[test]
    fn test_extract_message_falls_back_to_message() {
        let body = r#"{"message":"User not found"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("User not found"));
    }

    #[test]
    fn test_extract_message_plain_text() {
        assert_eq!(extract_message("  oops \n").as_deref(), Some("oops"));
    }

    #[test]
    fn test_extract_message_empty_or_uninformative() {
        assert!(extract_message("").is_none());
        assert!(extract_message(r#"{"errors":[]}"#).is_none());
        assert!(extract_message(r#"{"title":""}"#).is_none());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let c = client("http://localhost:8889");
        assert_eq!(
            c.endpoint("/issues/list").unwrap().as_str(),
            "http://localhost:8889/issues/list"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let c = client("https://example.com/api/");
        assert_eq!(
            c.endpoint("/users/login").unwrap().as_str(),
            "https://example.com/api/users/login"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = ApiConfig {
            base_url: "localhost".to_string(),
            timeout_seconds: None,
        };
        let result = ApiClient::new(&config, Arc::new(MemorySessionStore::new()));
        assert!(matches!(result, Err(IssueDeskError::Config(_))));
    }

    #[test]
    fn test_api_response_json_malformed_is_unknown() {
        let response = ApiResponse {
            status: 200,
            body: "<html>".to_string(),
            ticket: RequestSequencer::new().issue(),
        };
        let result: Result<Vec<u32>> = response.json();
        assert!(matches!(result, Err(IssueDeskError::Unknown(_))));
    }

    #[test]
    fn test_sequencer_is_keyed_by_operation() {
        let c = client("http://localhost:8889");
        let list = c.sequencer(&Method::GET, "/issues/list");
        let ticket = list.issue();

        c.sequencer(&Method::GET, "/issues/7").issue();
        c.sequencer(&Method::DELETE, "/issues/list").issue();

        assert!(list.is_latest(ticket));
        assert!(Arc::ptr_eq(&list, &c.sequencer(&Method::GET, "issues/list")));
    }

    #[test]
    fn test_api_request_builder() {
        let request = ApiRequest::new(Method::POST, "/x")
            .header("X-Trace", "1")
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(request.path(), "/x");
        assert_eq!(request.headers.len(), 1);
        assert!(request.body.is_some());
    }
}
