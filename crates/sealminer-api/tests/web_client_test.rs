#![allow(clippy::unwrap_used)]
// Integration tests for `SealminerClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sealminer_api::{AuthOutcome, Error, RequestBody, SealminerClient, SessionIdGenerator};

const SEED: u64 = 0x5ea1;

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SealminerClient) {
    let server = MockServer::start().await;
    let client = client_for(&server.uri());
    (server, client)
}

fn client_for(uri: &str) -> SealminerClient {
    let base_url = Url::parse(uri).unwrap();
    SealminerClient::with_client(reqwest::Client::new(), base_url, "seal".to_string().into())
        .with_session_ids(SessionIdGenerator::with_seed(SEED))
}

/// The first session id a client seeded with `SEED` will present.
fn expected_session_id() -> String {
    SessionIdGenerator::with_seed(SEED)
        .generate()
        .as_str()
        .to_owned()
}

fn command_cookie() -> String {
    format!(
        "username=seal; userLanguage=en; PHPSESSID={}",
        expected_session_id()
    )
}

async fn mount_login(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn command_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_owned())
        .filter(|p| p != "/cgi-bin/login.php")
        .collect()
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_caches_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .and(header(
            "cookie",
            format!("userLanguage=en; PHPSESSID={}", expected_session_id()).as_str(),
        ))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=seal"))
        .and(body_string_contains("origin_pwd=seal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client.authenticate().await;

    let token = outcome.token().unwrap();
    assert_eq!(token.as_str(), expected_session_id());
    assert_eq!(client.token().unwrap().as_str(), expected_session_id());
}

#[tokio::test]
async fn test_login_float_zero_state_is_authenticated() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0.0 })).await;

    let outcome = client.authenticate().await;

    assert!(outcome.is_authenticated(), "expected Authenticated, got: {outcome:?}");
    assert_eq!(client.token().unwrap().as_str(), expected_session_id());
}

#[tokio::test]
async fn test_login_denied_leaves_token_unset() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 1 })).await;

    let outcome = client.authenticate().await;

    assert!(
        matches!(outcome, AuthOutcome::Denied { state: Some(1), .. }),
        "expected Denied, got: {outcome:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_missing_state_is_denied() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "message": "ok" })).await;

    let outcome = client.authenticate().await;

    assert!(
        matches!(outcome, AuthOutcome::Denied { state: None, .. }),
        "expected Denied, got: {outcome:?}"
    );
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_login_http_error_is_denied() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let outcome = client.authenticate().await;

    assert!(
        matches!(outcome, AuthOutcome::Denied { status: 403, .. }),
        "expected Denied, got: {outcome:?}"
    );
}

#[tokio::test]
async fn test_login_non_json_is_undecodable() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let outcome = client.authenticate().await;

    assert!(
        matches!(outcome, AuthOutcome::Undecodable { .. }),
        "expected Undecodable, got: {outcome:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_transport_failure() {
    // Nothing listens on port 1.
    let client = client_for("http://127.0.0.1:1");

    let outcome = client.authenticate().await;

    assert!(
        matches!(outcome, AuthOutcome::TransportFailed(_)),
        "expected TransportFailed, got: {outcome:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_failed_relogin_clears_previous_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": 0 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_login(&server, json!({ "state": 1 })).await;

    assert!(client.authenticate().await.is_authenticated());
    assert!(client.is_authenticated());

    assert!(!client.authenticate().await.is_authenticated());
    assert!(!client.is_authenticated());
}

// ── Dispatch tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_system_info_reuses_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_system_info.php"))
        .and(header("cookie", command_cookie().as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "firmware": "2024.1", "uptime": 42 })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let first = client.get_system_info().await.unwrap();
    let second = client.send_command("get_system_info", RequestBody::Empty).await.unwrap();

    assert_eq!(first["firmware"], "2024.1");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_denied_login_never_sends_command() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 1 })).await;

    Mock::given(path("/cgi-bin/reboot.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.reboot().await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(command_paths(&server).await.is_empty());
}

#[tokio::test]
async fn test_unreachable_miner_fails_authentication() {
    let client = client_for("http://127.0.0.1:1");

    let result = client.get_miner_type().await;

    assert!(
        matches!(result, Err(Error::Authentication { ref host }) if host == "127.0.0.1"),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_raw_payload_is_form_post() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/custom_setting.php"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("{fan_speed:80}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .send_command("custom_setting", RequestBody::raw("{fan_speed:80}"))
        .await
        .unwrap();

    assert_eq!(resp, json!({ "result": 0 }));
}

#[tokio::test]
async fn test_structured_params_are_json_post() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    let conf = json!({
        "pool1": "stratum+tcp://pool.example:3333",
        "worker1": "rig.01",
        "passwd1": "x"
    });

    Mock::given(method("POST"))
        .and(path("/cgi-bin/set_miner_poolconf.php"))
        .and(header("cookie", command_cookie().as_str()))
        .and(body_json(&conf))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .set_miner_poolconf(conf.as_object().unwrap().clone())
        .await
        .unwrap();

    assert_eq!(resp["result"], "ok");
}

#[tokio::test]
async fn test_empty_structured_params_are_get() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_mining_mode.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mode": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .send_command(
            "get_mining_mode",
            RequestBody::Structured(serde_json::Map::new()),
        )
        .await
        .unwrap();

    assert_eq!(resp["mode"], 1);
}

#[tokio::test]
async fn test_start_and_stop_mining_payloads() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/mining_setting.php"))
        .and(body_string("{parama_data:1}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mining": "on" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/mining_setting.php"))
        .and(body_string("{parama_data:0}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mining": "off" })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.restart_mining().await.unwrap()["mining"], "on");
    assert_eq!(client.stop_mining().await.unwrap()["mining"], "off");
}

#[tokio::test]
async fn test_http_500_is_command_failure() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_miner_error_code.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.get_miner_error_code().await.unwrap_err();

    assert!(
        matches!(err, Error::CommandFailed { .. }),
        "expected CommandFailed error, got: {err:?}"
    );
    assert_eq!(err.command(), Some("get_miner_error_code"));
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Command failed: get_miner_error_code");
}

#[tokio::test]
async fn test_stale_session_is_not_refreshed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_network_info.php"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    for _ in 0..2 {
        let result = client.get_network_info().await;
        assert!(
            matches!(result, Err(Error::CommandFailed { status: Some(401), .. })),
            "expected CommandFailed, got: {result:?}"
        );
    }
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_clear_session_forces_relogin() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": 0 })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_miner_type.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "A2" })))
        .expect(2)
        .mount(&server)
        .await;

    client.get_miner_type().await.unwrap();
    let first = client.token().unwrap();

    client.clear_session();
    client.get_miner_type().await.unwrap();
    let second = client.token().unwrap();

    assert_ne!(first.as_str(), second.as_str());
}

#[tokio::test]
async fn test_non_json_command_response_is_deserialization_error() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_miner_monitor_status.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_miner_monitor_status().await;

    match result {
        Err(Error::Deserialization { command, body, .. }) => {
            assert_eq!(command, "get_miner_monitor_status");
            assert_eq!(body, "<html>oops</html>");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_command_name_sends_nothing() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    let result = client.send_command("../login", RequestBody::Empty).await;

    assert!(matches!(result, Err(Error::InvalidCommand(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hyphenated_command_name_is_sent() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/get-led-status.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "led": "off" })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client
        .send_command("get-led-status", RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(value, json!({ "led": "off" }));
}

// ── Multicommand tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_multicommand_collects_results() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    for (cmd, body) in [
        ("get_miner_type", json!({ "type": "A2" })),
        ("get_mining_mode", json!({ "mode": 0 })),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/cgi-bin/{cmd}.php")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }

    let results = client
        .multicommand(&["get_miner_type", "get_mining_mode"], false)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results["get_miner_type"]["type"], "A2");
    assert_eq!(results["get_mining_mode"]["mode"], 0);
}

#[tokio::test]
async fn test_multicommand_ignore_errors() {
    let (server, client) = setup().await;
    mount_login(&server, json!({ "state": 0 })).await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_miner_type.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "A2" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_network_info.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let commands = ["get_miner_type", "get_network_info"];

    let partial = client.multicommand(&commands, true).await.unwrap();
    assert_eq!(partial.keys().collect::<Vec<_>>(), vec!["get_miner_type"]);

    let strict = client.multicommand(&commands, false).await;
    assert_eq!(
        strict.unwrap_err().command(),
        Some("get_network_info"),
        "strict multicommand should surface the failing command"
    );
}
