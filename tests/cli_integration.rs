//! End-to-end tests for the `chatgenie` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn chatgenie() -> Command {
    let mut cmd = Command::cargo_bin("chatgenie").unwrap();
    for var in [
        "CHATGENIE_BASE_URL",
        "CHATGENIE_TIMEOUT_SECONDS",
        "CHATGENIE_MAX_ATTEMPTS",
        "CHATGENIE_RETRY_DELAY_MS",
        "CHATGENIE_USERNAME",
        "CHATGENIE_STORE_PATH",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_version_flag() {
    chatgenie().arg("--version").assert().success();
}

#[test]
fn test_ephemeral_history_list_shows_seed_chat() {
    chatgenie()
        .args(["--ephemeral", "history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ChatGenie"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_dir, config_path) = common::temp_config_file(
        r#"
endpoint:
  base_url: "ftp://localhost:5000"
"#,
    );

    chatgenie()
        .arg("--config")
        .arg(config_path)
        .args(["--ephemeral", "history", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_history_changes_persist_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("chat_store");

    chatgenie()
        .arg("--store-path")
        .arg(&store)
        .args(["history", "rename", "default", "Groceries"])
        .assert()
        .success();

    chatgenie()
        .arg("--store-path")
        .arg(&store)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries"));
}

#[test]
fn test_unknown_chat_id_fails() {
    chatgenie()
        .args(["--ephemeral", "history", "select", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no chat matches 'nope'"));
}

#[tokio::test]
async fn test_send_prints_reply_and_records_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi there"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("chat_store");

    chatgenie()
        .env("CHATGENIE_BASE_URL", server.uri())
        .arg("--store-path")
        .arg(&store)
        .args(["send", "Hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hi there"));

    chatgenie()
        .arg("--store-path")
        .arg(&store)
        .args(["history", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello").and(predicate::str::contains("Hi there")));
}

#[tokio::test]
async fn test_send_failure_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    chatgenie()
        .env("CHATGENIE_BASE_URL", server.uri())
        .args(["--ephemeral", "send", "Hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to send message: Server Error: 500 Internal Server Error",
        ));
}

#[tokio::test]
async fn test_health_command() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .mount(&server)
        .await;

    chatgenie()
        .env("CHATGENIE_BASE_URL", server.uri())
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("healthy"));
}
