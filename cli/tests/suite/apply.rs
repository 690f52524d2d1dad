#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;

use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::common::admin_assistant;

const PROPOSAL: &str = r#"```json
{ "version": 1, "requests": [
  { "method": "PUT", "path": "/admin/deployment/config/LLM_MODEL", "body": { "value": "large" } }
] }
```"#;

async fn mount_checks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/admin/deployment/config/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true, "warnings": [], "errors": []
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/deployment/config/restart-required"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": ["LLM_MODEL"] })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn applies_with_yes_and_prints_the_summary() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/user-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/deployment/config/LLM_MODEL"))
        .and(header("authorization", "Bearer admin-token-123"))
        .and(body_json(json!({ "value": "large" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    mount_checks(&server).await;

    let home = tempdir()?;
    admin_assistant(home.path())
        .args(["--base-url", &server.uri(), "--token", "admin-token-123"])
        .args(["apply", "--yes"])
        .write_stdin(PROPOSAL)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. PUT /admin/deployment/config/LLM_MODEL"))
        .stdout(predicate::str::contains(
            "Applied 1/1 request.\nConfig validation: valid (0 warnings, 0 errors)\nRestart required for: LLM_MODEL\n",
        ))
        .stdout(predicate::str::contains("admin-token-123").not());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_request_exits_non_zero_and_json_has_outcomes() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/deployment/config/LLM_MODEL"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "unknown model" })),
        )
        .mount(&server)
        .await;
    mount_checks(&server).await;

    let home = tempdir()?;
    let message = home.path().join("turn.md");
    fs::write(&message, PROPOSAL)?;

    let output = admin_assistant(home.path())
        .args(["--base-url", &server.uri()])
        .args(["apply", "--yes", "--json"])
        .arg(&message)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout)?;
    let summary: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(
        summary["outcomes"],
        json!([{
            "ok": false,
            "method": "PUT",
            "path": "/admin/deployment/config/LLM_MODEL",
            "status": 400,
            "error": "unknown model"
        }])
    );
    assert_eq!(summary["unauthenticated"], json!(false));
    Ok(())
}

#[test]
fn stdin_input_without_yes_is_refused() -> anyhow::Result<()> {
    let home = tempdir()?;

    admin_assistant(home.path())
        .args(["--base-url", "http://127.0.0.1:9", "apply"])
        .write_stdin(PROPOSAL)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pass --yes"));
    Ok(())
}

#[test]
fn declining_the_prompt_applies_nothing() -> anyhow::Result<()> {
    let home = tempdir()?;
    let message = home.path().join("turn.md");
    fs::write(&message, PROPOSAL)?;

    // Nothing listens here, so any request would surface as a failure.
    admin_assistant(home.path())
        .args(["--base-url", "http://127.0.0.1:9", "apply"])
        .arg(&message)
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Apply 1 request? [y/N]"))
        .stderr(predicate::str::contains("Nothing applied."));
    Ok(())
}

#[test]
fn message_without_a_change_set_is_an_error() -> anyhow::Result<()> {
    let home = tempdir()?;

    admin_assistant(home.path())
        .args(["apply", "--yes"])
        .write_stdin("Nothing to change here.")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No change set found"));
    Ok(())
}
