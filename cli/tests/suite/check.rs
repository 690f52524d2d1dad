#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::json;
use tempfile::tempdir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

use super::common::admin_assistant;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn prints_both_health_notes() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/deployment/config/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false, "warnings": ["a"], "errors": ["b", "c"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/deployment/config/restart-required"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": ["WORKERS"] })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempdir()?;
    admin_assistant(home.path())
        .args(["--base-url", &server.uri(), "check"])
        .assert()
        .success()
        .stdout(
            "Config validation: invalid (1 warning, 2 errors)\nRestart required for: WORKERS\n",
        );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_checks_are_printed_as_notes() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    let home = tempdir()?;
    admin_assistant(home.path())
        .args(["--base-url", &server.uri(), "check"])
        .assert()
        .success()
        .stdout("Config validation: failed (Not Found)\nRestart check: failed (Not Found)\n");
    Ok(())
}
