//! Health checks run after every apply. Each produces one note for the
//! summary; a failing check becomes a "failed" note, never an error.
use serde_json::Value;
use tracing::warn;

use crate::backend::AdminBackend;
use crate::backend::BackendError;
use crate::backend::BackendResponse;
use crate::backend::HttpMethod;

pub const CONFIG_VALIDATE_PATH: &str = "/admin/deployment/config/validate";
pub const RESTART_REQUIRED_PATH: &str = "/admin/deployment/config/restart-required";

pub async fn run_post_apply_checks<B: AdminBackend>(backend: &B) -> Vec<String> {
    vec![
        check_config_validation(backend).await,
        check_restart_required(backend).await,
    ]
}

pub async fn check_config_validation<B: AdminBackend>(backend: &B) -> String {
    match successful_json(backend.send(HttpMethod::Post, CONFIG_VALIDATE_PATH, None).await) {
        Ok(body) => summarize_validation(&body),
        Err(detail) => {
            warn!("config validation check failed: {detail}");
            format!("Config validation: failed ({detail})")
        }
    }
}

pub async fn check_restart_required<B: AdminBackend>(backend: &B) -> String {
    match successful_json(backend.send(HttpMethod::Get, RESTART_REQUIRED_PATH, None).await) {
        Ok(body) => summarize_restart(&body),
        Err(detail) => {
            warn!("restart-required check failed: {detail}");
            format!("Restart check: failed ({detail})")
        }
    }
}

fn successful_json(result: Result<BackendResponse, BackendError>) -> Result<Value, String> {
    let resp = result.map_err(|e| e.to_string())?;
    if !resp.is_success() {
        return Err(resp.error_detail());
    }
    resp.body
        .ok_or_else(|| "response was not JSON".to_string())
}

/// `{ "valid": bool, "warnings": [...] | n, "errors": [...] | n }`
fn summarize_validation(body: &Value) -> String {
    let errors = count_of(body.get("errors"));
    let warnings = count_of(body.get("warnings"));
    let valid = body
        .get("valid")
        .and_then(Value::as_bool)
        .unwrap_or(errors == 0);
    format!(
        "Config validation: {} ({warnings} {}, {errors} {})",
        if valid { "valid" } else { "invalid" },
        if warnings == 1 { "warning" } else { "warnings" },
        if errors == 1 { "error" } else { "errors" },
    )
}

fn count_of(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Array(items)) => items.len() as u64,
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// Accepts a bare array of keys, or an object listing them under `keys` or
/// `restart_required`. Entries may be strings or `{ "key": ... }` objects.
fn summarize_restart(body: &Value) -> String {
    let entries = match body {
        Value::Array(entries) => Some(entries),
        Value::Object(obj) => obj
            .get("keys")
            .or_else(|| obj.get("restart_required"))
            .and_then(Value::as_array),
        _ => None,
    };
    let keys: Vec<&str> = entries
        .into_iter()
        .flatten()
        .filter_map(|entry| match entry {
            Value::String(key) => Some(key.as_str()),
            other => other.get("key").and_then(Value::as_str),
        })
        .collect();
    if keys.is_empty() {
        "No restart required.".to_string()
    } else {
        format!("Restart required for: {}", keys.join(", "))
    }
}
