//! Sequential application of a validated change set.
//!
//! Requests run strictly one after another: a later request may reference a
//! user type that an earlier request creates, and its id only becomes known
//! once that earlier response has been read. Failures are recorded per
//! request and never stop the run.
use admin_assistant_changeset::Method;
use admin_assistant_changeset::SlugMap;
use admin_assistant_changeset::USER_TYPE_COLLECTION_PATH;
use admin_assistant_changeset::ValidatedChangeSet;
use admin_assistant_changeset::is_user_type_creation;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::backend::AdminBackend;
use crate::backend::BackendError;
use crate::backend::HttpMethod;

/// Result of one executed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub ok: bool,
    pub method: Method,
    /// Path after placeholder resolution, or as written when resolution failed.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestOutcome {
    fn succeeded(method: Method, path: String, status: u16) -> Self {
        Self {
            ok: true,
            method,
            path,
            status: Some(status),
            error: None,
        }
    }

    fn failed(method: Method, path: String, status: Option<u16>, error: String) -> Self {
        Self {
            ok: false,
            method,
            path,
            status,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<RequestOutcome>,
    /// Set when any request was refused for lack of a valid session.
    pub unauthenticated: bool,
}

impl ApplyReport {
    pub fn ok_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }

    pub fn fail_count(&self) -> usize {
        self.outcomes.len() - self.ok_count()
    }

    pub fn summary_line(&self) -> String {
        let total = self.outcomes.len();
        let noun = if total == 1 { "request" } else { "requests" };
        format!("Applied {}/{total} {noun}.", self.ok_count())
    }

    /// One `METHOD path: error` line per failed request.
    pub fn failure_details(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.ok)
            .map(|o| {
                format!(
                    "{} {}: {}",
                    o.method,
                    o.path,
                    o.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect()
    }
}

/// Build the slug map from the user types that already exist. Failure to
/// list them is not fatal: resolution starts from an empty map.
pub async fn seed_slug_map<B: AdminBackend>(backend: &B) -> SlugMap {
    let mut slug_map = SlugMap::new();
    match backend
        .send(HttpMethod::Get, USER_TYPE_COLLECTION_PATH, None)
        .await
    {
        Ok(resp) if resp.is_success() => match &resp.body {
            Some(listing) => {
                let seeded = slug_map.seed_from_listing(listing);
                debug!(seeded, "seeded user type slugs");
            }
            None => warn!("user type listing was not JSON; starting with no known user types"),
        },
        Ok(resp) => warn!(
            status = resp.status,
            "failed to list user types: {}",
            resp.error_detail()
        ),
        Err(e) => warn!("failed to list user types: {e}"),
    }
    slug_map
}

/// Execute every request in order, resolving placeholders just before each
/// send and learning new user type ids from successful creations.
pub async fn apply_change_set<B: AdminBackend>(
    backend: &B,
    change_set: ValidatedChangeSet,
    slug_map: &mut SlugMap,
) -> ApplyReport {
    let change_set = change_set.into_inner();
    let total = change_set.requests.len();
    let mut report = ApplyReport {
        outcomes: Vec::with_capacity(total),
        unauthenticated: false,
    };

    for (i, request) in change_set.requests.iter().enumerate() {
        let resolved = match slug_map.resolve_request(request) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(index = i + 1, total, "{} {}: {e}", request.method, request.path);
                report.outcomes.push(RequestOutcome::failed(
                    request.method,
                    request.path.clone(),
                    None,
                    e.to_string(),
                ));
                continue;
            }
        };

        debug!(index = i + 1, total, method = %resolved.method, path = %resolved.path, "applying request");
        let outcome = match backend
            .send(resolved.method.into(), &resolved.path, resolved.body.as_ref())
            .await
        {
            Ok(resp) if resp.is_success() => {
                if is_user_type_creation(resolved.method, &resolved.path) {
                    match resp.body.as_ref().and_then(|b| slug_map.learn_from_creation(b)) {
                        Some(slug) => debug!(%slug, "learned id for new user type"),
                        None => warn!("user type created but the response carried no id and name"),
                    }
                }
                RequestOutcome::succeeded(resolved.method, resolved.path, resp.status)
            }
            Ok(resp) => {
                RequestOutcome::failed(
                    resolved.method,
                    resolved.path,
                    Some(resp.status),
                    resp.error_detail(),
                )
            }
            Err(BackendError::Unauthenticated) => {
                report.unauthenticated = true;
                RequestOutcome::failed(
                    resolved.method,
                    resolved.path,
                    Some(401),
                    BackendError::Unauthenticated.to_string(),
                )
            }
            Err(e @ BackendError::Transport(_)) => {
                RequestOutcome::failed(resolved.method, resolved.path, None, e.to_string())
            }
        };
        if !outcome.ok {
            warn!(
                index = i + 1,
                total,
                "{} {} failed: {}",
                outcome.method,
                outcome.path,
                outcome.error.as_deref().unwrap_or_default()
            );
        }
        report.outcomes.push(outcome);
    }

    info!(
        ok = report.ok_count(),
        failed = report.fail_count(),
        "change set applied"
    );
    report
}
