use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use issuedesk::config::ApiConfig;
use issuedesk::http::ApiClient;
use issuedesk::session::{MemorySessionStore, Session, SessionStore};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Client for `base_url` over a fresh in-memory store.
#[allow(dead_code)]
pub fn client_for(base_url: &str) -> (Arc<ApiClient>, Arc<dyn SessionStore>) {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let client = client_with_store(base_url, Arc::clone(&store));
    (client, store)
}

/// Client for `base_url` whose store already holds a session.
#[allow(dead_code)]
pub fn signed_in_client(base_url: &str, token: &str) -> (Arc<ApiClient>, Arc<dyn SessionStore>) {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_session(Session::new(
        token, "x", "e@x.com",
    )));
    let client = client_with_store(base_url, Arc::clone(&store));
    (client, store)
}

#[allow(dead_code)]
pub fn client_with_store(base_url: &str, store: Arc<dyn SessionStore>) -> Arc<ApiClient> {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: Some(5),
    };
    Arc::new(ApiClient::new(&config, store).expect("client should build"))
}

/// A base URL nothing listens on.
#[allow(dead_code)]
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Wire representation of an issue as the server sends it.
#[allow(dead_code)]
pub fn wire_issue(id: u64, title: &str, status: &str, priority: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{} description", title),
        "status": status,
        "priority": priority,
        "createdAt": "2025-09-17T10:00:00Z",
        "updatedAt": "2025-09-18T10:00:00Z",
        "userId": "u1"
    })
}
