mod common;

use common::{FakeTransport, PASSWORD, USERNAME, connect, login_ok, test_config, transport};
use newt::client::{AuthState, HttpMethod};
use newt::config::ConfigPaths;
use newt::{NewtClient, NewtConfig, NewtError};
use rstest::rstest;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[rstest]
fn test_login_sends_credentials(transport: FakeTransport) {
    let client = connect(&transport);

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/login");
    assert_eq!(request.form_value("username"), Some(USERNAME));
    assert_eq!(request.form_value("password"), Some(PASSWORD));

    let session = client.session();
    assert!(session.is_authenticated());
    assert_eq!(session.username(), USERNAME);
    assert_eq!(session.session_id(), Some("0123456789abcdef"));
    assert!(session.expires_at().is_some());
}

#[rstest]
fn test_constructor_fails_when_auth_rejected() {
    let transport = FakeTransport::new();
    transport.respond_json(HttpMethod::Post, "/login", json!({"auth": false}));

    let result = NewtClient::with_transport(&test_config(), Box::new(transport), USERNAME, "wrong");
    match result {
        Err(NewtError::Authentication { username }) => assert_eq!(username, USERNAME),
        other => panic!("expected authentication error, got {:?}", other.err()),
    }
}

#[rstest]
fn test_constructor_fails_on_username_mismatch() {
    let transport = FakeTransport::new();
    transport.respond_json(HttpMethod::Post, "/login", login_ok("mallory"));

    let result = NewtClient::with_transport(&test_config(), Box::new(transport), USERNAME, PASSWORD);
    assert!(matches!(result, Err(NewtError::Authentication { .. })));
}

#[rstest]
fn test_constructor_fails_on_http_error() {
    let transport = FakeTransport::new();
    transport.respond(HttpMethod::Post, "/login", 500, "internal error");

    let result = NewtClient::with_transport(&test_config(), Box::new(transport), USERNAME, PASSWORD);
    match result {
        Err(NewtError::Http { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected HTTP error, got {:?}", other.err()),
    }
}

#[rstest]
fn test_login_then_is_auth(transport: FakeTransport) {
    transport.respond_json(HttpMethod::Get, "/auth", json!({"auth": true, "username": USERNAME}));
    let mut client = connect(&transport);

    assert!(client.login(USERNAME, PASSWORD).unwrap());
    assert!(client.is_auth().unwrap());
    assert_eq!(transport.last_request().path, "/auth");
}

#[rstest]
fn test_logout_then_is_auth(transport: FakeTransport) {
    transport.respond_json(HttpMethod::Get, "/logout", json!({"auth": false}));
    transport.respond_json(HttpMethod::Get, "/auth", json!({"auth": false}));
    let mut client = connect(&transport);

    assert!(client.logout().unwrap());
    assert_eq!(client.session().state(), AuthState::LoggedOut);
    assert!(!client.is_auth().unwrap());
}

#[rstest]
fn test_relogin_replaces_identity(transport: FakeTransport) {
    let mut client = connect(&transport);

    transport.respond_json(HttpMethod::Post, "/login", login_ok("bob"));
    assert!(client.login("bob", "hunter2").unwrap());
    assert_eq!(client.session().username(), "bob");
    assert!(client.session().is_authenticated());
}

#[rstest]
fn test_rejected_relogin_marks_session_logged_out(transport: FakeTransport) {
    let mut client = connect(&transport);

    transport.respond_json(HttpMethod::Post, "/login", json!({"auth": false}));
    let result = client.login(USERNAME, "wrong");
    assert!(matches!(result, Err(NewtError::Authentication { .. })));
    assert!(!client.session().is_authenticated());
}

#[rstest]
fn test_expired_session_surfaces_as_http_error(transport: FakeTransport) {
    transport.respond(HttpMethod::Get, "/auth", 401, "session expired");
    let client = connect(&transport);

    let err = client.is_auth().unwrap_err();
    assert!(err.is_unauthorized());
    // No automatic re-authentication
    assert_eq!(
        transport
            .requests()
            .iter()
            .filter(|r| r.path == "/login")
            .count(),
        1
    );
}

#[rstest]
fn test_fake_transport_has_no_cookie(transport: FakeTransport) {
    let client = connect(&transport);
    assert!(client.session_cookie().is_none());
}

#[rstest]
fn test_client_uses_machines_from_loaded_config(transport: FakeTransport) {
    let temp_dir = TempDir::new().unwrap();
    let local = temp_dir.path().join("newt.toml");
    fs::write(
        &local,
        r#"
[client]
base_url = "https://newt.test/newt"
machines = ["perlmutter"]
systems = ["perlmutter", "archive"]
download_chunk_size = 4096
"#,
    )
    .unwrap();
    let paths = ConfigPaths {
        system: PathBuf::from("/nonexistent/system/config.toml"),
        user: None,
        local,
    };
    let config = NewtConfig::load_with_paths(&paths).unwrap();

    transport.respond_json(HttpMethod::Get, "/file/perlmutter/global/homes/a", json!([]));
    let client =
        NewtClient::with_transport(&config, Box::new(transport.clone()), USERNAME, PASSWORD)
            .unwrap();

    assert!(client.registry().is_machine("perlmutter"));
    assert!(!client.registry().is_machine("hopper"));
    assert!(client.list("perlmutter", "/global/homes/a").unwrap().is_empty());
    assert_eq!(transport.last_request().path, "/file/perlmutter/global/homes/a");
    assert!(matches!(
        client.list("hopper", "/global/homes/a"),
        Err(NewtError::InvalidMachine { .. })
    ));
}
