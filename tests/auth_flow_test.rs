//! Auth service integration tests
//!
//! Drives `AuthService` and `ApiClient` against a `wiremock` server and
//! checks what ends up in the session store and on the wire.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use issuedesk::auth::{AuthService, AuthState};
use issuedesk::error::IssueDeskError;
use issuedesk::issues::IssueService;
use issuedesk::session::{Session, SessionStore};

mod common;

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T1",
            "username": "x",
            "email": "e@x.com"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_persists_session_and_returns_profile() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({
            "userName": "x",
            "email": "e@x.com",
            "password": "p"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T1",
            "username": "x",
            "email": "e@x.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = common::client_for(&server.uri());
    let auth = AuthService::new(client);

    let profile = auth.login("x", "e@x.com", "p").await.expect("login");
    assert_eq!(profile.username, "x");
    assert_eq!(profile.email, "e@x.com");

    let stored = store.load().await.unwrap().expect("session stored");
    assert_eq!(stored, Session::new("T1", "x", "e@x.com"));
    assert_eq!(
        auth.state().await.unwrap(),
        AuthState::Authenticated(Session::new("T1", "x", "e@x.com"))
    );
}

#[tokio::test]
async fn test_requests_after_login_carry_bearer_token() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/issues/list"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = common::client_for(&server.uri());
    let auth = AuthService::new(Arc::clone(&client));
    let issues = IssueService::new(client);

    auth.login("x", "e@x.com", "p").await.unwrap();
    let list = issues.list().await.expect("authorized list");
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_anonymous_requests_have_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/issues/list"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/issues/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = common::client_for(&server.uri());
    let issues = IssueService::new(client);
    issues.list().await.expect("anonymous request without header");
}

#[tokio::test]
async fn test_login_401_is_invalid_credentials_and_stores_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"title": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let (client, store) = common::client_for(&server.uri());
    let auth = AuthService::new(client);

    let err = auth.login("x", "e@x.com", "wrong").await.unwrap_err();
    assert!(matches!(err, IssueDeskError::InvalidCredentials));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_server_error_carries_title() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"title": "Database offline"})),
        )
        .mount(&server)
        .await;

    let (client, _store) = common::client_for(&server.uri());
    let err = AuthService::new(client)
        .login("x", "", "p")
        .await
        .unwrap_err();

    match err {
        IssueDeskError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Database offline");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_without_token_is_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "",
            "username": "x",
            "email": "e@x.com"
        })))
        .mount(&server)
        .await;

    let (client, store) = common::client_for(&server.uri());
    let err = AuthService::new(client)
        .login("x", "e@x.com", "p")
        .await
        .unwrap_err();

    assert!(matches!(err, IssueDeskError::Unknown(_)));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_validation_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = common::client_for(&server.uri());
    let auth = AuthService::new(client);

    assert!(matches!(
        auth.login("", "", "p").await,
        Err(IssueDeskError::Validation(_))
    ));
    assert!(matches!(
        auth.login("x", "e@x.com", "").await,
        Err(IssueDeskError::Validation(_))
    ));
}

#[tokio::test]
async fn test_login_network_unavailable() {
    let (client, store) = common::client_for(&common::unreachable_base_url());
    let err = AuthService::new(client)
        .login("x", "e@x.com", "p")
        .await
        .unwrap_err();

    assert!(err.is_network(), "expected network error, got {:?}", err);
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_clears_session_when_server_confirms() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = common::signed_in_client(&server.uri(), "T1");
    let outcome = AuthService::new(client).logout().await.expect("logout");

    assert!(outcome.remote_confirmed);
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_clears_session_when_server_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, store) = common::signed_in_client(&server.uri(), "T1");
    let outcome = AuthService::new(client).logout().await.expect("logout");

    assert!(!outcome.remote_confirmed);
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_clears_session_when_server_unreachable() {
    let (client, store) = common::signed_in_client(&common::unreachable_base_url(), "T1");
    let auth = AuthService::new(client);

    let outcome = auth.logout().await.expect("logout succeeds locally");
    assert!(!outcome.remote_confirmed);
    assert!(store.load().await.unwrap().is_none());
    assert_eq!(auth.state().await.unwrap(), AuthState::Anonymous);
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let (client, store) = common::signed_in_client(&common::unreachable_base_url(), "T1");
    let auth = AuthService::new(client);

    auth.logout().await.unwrap();
    auth.logout().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_signup_succeeds_only_on_201() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .and(body_json(json!({
            "userName": "x",
            "email": "e@x.com",
            "password": "p"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = common::client_for(&server.uri());
    AuthService::new(client)
        .signup("x", "e@x.com", "p")
        .await
        .expect("signup");

    // Registration does not sign the user in.
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_signup_with_200_is_not_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (client, _store) = common::client_for(&server.uri());
    let err = AuthService::new(client)
        .signup("x", "e@x.com", "p")
        .await
        .unwrap_err();
    assert!(matches!(err, IssueDeskError::Unknown(_)));
}

#[tokio::test]
async fn test_signup_conflict_surfaces_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"title": "User already exists"})),
        )
        .mount(&server)
        .await;

    let (client, _store) = common::client_for(&server.uri());
    let err = AuthService::new(client)
        .signup("x", "e@x.com", "p")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.user_message(), "User already exists");
}

#[tokio::test]
async fn test_reset_password_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/reset-password"))
        .and(body_json(json!({
            "userNameOrEmail": "x",
            "newPassword": "n"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = common::signed_in_client(&server.uri(), "T1");
    AuthService::new(client)
        .reset_password("x", "n")
        .await
        .expect("reset");

    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_reset_password_unknown_user_is_404() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/reset-password"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})),
        )
        .mount(&server)
        .await;

    let (client, store) = common::signed_in_client(&server.uri(), "T1");
    let err = AuthService::new(client)
        .reset_password("ghost", "n")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "User not found");
    // A failed reset leaves the session alone.
    assert!(store.load().await.unwrap().is_some());
}
