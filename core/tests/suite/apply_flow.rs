#![allow(clippy::expect_used, clippy::unwrap_used)]

use admin_assistant_core::AdminAssistant;
use admin_assistant_core::Proposal;
use admin_assistant_core::ReqwestBackend;
use admin_assistant_core::changeset::ValidatedChangeSet;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

async fn mount_healthy_checks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/admin/deployment/config/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true, "warnings": [], "errors": []
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/deployment/config/restart-required"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
        .mount(server)
        .await;
}

fn ready(assistant: &AdminAssistant<ReqwestBackend>, text: &str) -> ValidatedChangeSet {
    match assistant.review(text).proposal {
        Proposal::Ready(validated) => validated,
        other => panic!("expected a ready proposal, got {other:?}"),
    }
}

#[tokio::test]
async fn placeholder_resolves_to_id_created_earlier_in_the_same_change_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/user-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Admin" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/user-types"))
        .and(body_json(json!({ "name": "Ops" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7, "name": "Ops" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/user-fields"))
        .and(body_json(json!({ "user_type_id": 7, "label": "Pager", "required": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 31 })))
        .expect(1)
        .mount(&server)
        .await;
    mount_healthy_checks(&server).await;

    let text = r#"I'll create the Ops user type and give it a pager field.

```json
{
  "version": 1,
  "summary": "Add Ops user type with a pager field",
  "requests": [
    { "method": "POST", "path": "/admin/user-types", "body": { "name": "Ops" } },
    { "method": "POST", "path": "/admin/user-fields",
      "body": { "user_type_id": "@type:ops", "label": "Pager", "required": true } }
  ]
}
```"#;
    let mut assistant = AdminAssistant::new(ReqwestBackend::from_base_url(&server.uri()).unwrap());
    let change_set = ready(&assistant, text);

    let summary = assistant.apply(change_set).await;

    assert_eq!(summary.ok_count(), 2);
    assert!(!summary.unauthenticated);
    assert_eq!(
        summary.message,
        "Applied 2/2 requests.\nConfig validation: valid (0 warnings, 0 errors)\nNo restart required."
    );
}

#[tokio::test]
async fn failed_first_request_does_not_stop_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/deployment/config/LLM_PROVIDER"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "vault unavailable" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/deployment/config/LLM_MODEL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/user-fields/4/encryption"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_healthy_checks(&server).await;
    Mock::given(method("GET"))
        .and(path("/admin/deployment/config/restart-required"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": ["LLM_MODEL"] })))
        .with_priority(1)
        .mount(&server)
        .await;

    let text = r#"```json
{ "version": 1, "requests": [
  { "method": "PUT", "path": "/admin/deployment/config/LLM_PROVIDER", "body": { "value": "anthropic" } },
  { "method": "PUT", "path": "/admin/deployment/config/LLM_MODEL", "body": { "value": "large" } },
  { "method": "PUT", "path": "/admin/user-fields/4/encryption", "body": { "enabled": true } }
] }
```"#;
    let mut assistant = AdminAssistant::new(ReqwestBackend::from_base_url(&server.uri()).unwrap());
    let change_set = ready(&assistant, text);

    let summary = assistant.apply(change_set).await;

    assert_eq!(summary.ok_count(), 2);
    assert_eq!(summary.fail_count(), 1);
    assert_eq!(summary.outcomes[0].status, Some(500));
    assert_eq!(summary.outcomes[2].status, Some(204));
    assert_eq!(
        summary.message,
        "Applied 2/3 requests.\n1 failed:\n- PUT /admin/deployment/config/LLM_PROVIDER: vault unavailable\nConfig validation: valid (0 warnings, 0 errors)\nRestart required for: LLM_MODEL"
    );
}

#[tokio::test]
async fn expired_session_is_flagged_and_secrets_are_scrubbed() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/instance-settings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/ai-config/system_prompt"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "detail": "value contains key sk-live-abcdef" })),
        )
        .mount(&server)
        .await;
    mount_healthy_checks(&server).await;

    let text = r#"```json
{ "version": 1, "requests": [
  { "method": "PUT", "path": "/admin/instance-settings", "body": { "name": "Acme" } },
  { "method": "PUT", "path": "/admin/ai-config/system_prompt", "body": { "value": "sk-live-abcdef" } }
] }
```"#;
    let mut assistant = AdminAssistant::new(ReqwestBackend::from_base_url(&server.uri()).unwrap())
        .with_secrets(vec!["sk-live-abcdef".to_string()]);
    let change_set = ready(&assistant, text);

    let summary = assistant.apply(change_set).await;

    assert!(summary.unauthenticated);
    assert_eq!(summary.fail_count(), 2);
    assert!(summary.message.contains("PUT /admin/instance-settings: not authenticated"));
    assert!(summary.message.contains("value contains key [REDACTED]"));
    assert!(!summary.message.contains("sk-live-abcdef"));
    assert!(summary.message.contains("sign in again"));
}
